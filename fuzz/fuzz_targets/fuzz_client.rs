#![no_main]

use arbitrary::Arbitrary;
use echo_http::{Client, MemoryChannel, Request};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzExchange {
    max_read: u8,
    keep_alive: bool,
    responses: Vec<Vec<u8>>,
}

fuzz_target!(|input: FuzzExchange| {
    let mut channel = MemoryChannel::new().max_read(usize::from(input.max_read));
    for response in &input.responses {
        channel.push_response(response.clone());
    }
    let mut client = Client::new(channel);
    client.set_keep_alive(input.keep_alive);
    client.set_request(Request::new());

    for _ in 0..input.responses.len() {
        if client.issue().is_err() {
            // 失敗したらチャネルは閉じている
            assert!(!client.is_channel_open());
        }
    }
    let _ = client.close();
    assert!(!client.is_channel_open());
});
