#![no_main]

use arbitrary::Arbitrary;
use echo_http::{Hooks, ParserLimits, Response, ResponseParser};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzLimits {
    max_reason_phrase_len: u8,
    max_header_key_len: u8,
    max_header_value_len: u16,
    max_headers_count: u8,
    max_body_size: u16,
    data: Vec<u8>,
}

fn build_limits(input: &FuzzLimits) -> ParserLimits {
    ParserLimits {
        max_reason_phrase_len: usize::from(input.max_reason_phrase_len),
        max_header_key_len: usize::from(input.max_header_key_len),
        max_header_value_len: usize::from(input.max_header_value_len),
        max_headers_count: usize::from(input.max_headers_count),
        max_body_size: usize::from(input.max_body_size),
        ..ParserLimits::default()
    }
}

fuzz_target!(|input: FuzzLimits| {
    let limits = build_limits(&input);
    let mut parser = ResponseParser::new(limits.clone());
    let mut response = Response::new();
    if parser.feed(&input.data, &mut response, &mut Hooks::none()).is_ok() {
        assert!(response.reason_phrase.len() <= limits.max_reason_phrase_len);
        assert!(response.headers.len() <= limits.max_headers_count);
        assert!(response.body.len() <= limits.max_body_size);
        for entry in &response.headers {
            assert!(entry.key().len() <= limits.max_header_key_len);
            assert!(entry.value().len() <= limits.max_header_value_len);
        }
    }
});
