//! 不完全なレスポンスのテスト
//!
//! 受信途中でストリームが終わった場合に、完了扱いにならないことを確認する。
//!
//! パーサーは不完全なデータに対して `Progress::Partial` を返し続けるだけで、
//! ストリームの終端は知らない。終端を検出して `ChannelEnd` にするのはクライアントの責務である。

use echo_http::{Client, Error, Hooks, MemoryChannel, Progress, Request, Response, ResponseParser};

/// 宣言より短いボディはパーサー単体では完了しない
#[test]
fn incomplete_body_stays_partial() {
    let mut parser = ResponseParser::default();
    let mut response = Response::new();
    let mut hooks = Hooks::none();

    let progress = parser
        .feed(
            b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n",
            &mut response,
            &mut hooks,
        )
        .unwrap();
    assert_eq!(progress, Progress::Partial);

    // 100 バイト中 50 バイトのみ
    let progress = parser.feed(&[b'x'; 50], &mut response, &mut hooks).unwrap();
    assert_eq!(progress, Progress::Partial);
    assert!(!parser.is_complete());
    assert_eq!(response.body.len(), 50);
}

/// ヘッダーの途中で終わった場合も完了しない
#[test]
fn incomplete_head_stays_partial() {
    let mut parser = ResponseParser::default();
    let mut response = Response::new();
    let progress = parser
        .feed(b"HTTP/1.1 200 OK\r\nServer: ec", &mut response, &mut Hooks::none())
        .unwrap();
    assert_eq!(progress, Progress::Partial);
    assert!(response.headers.is_empty());
}

/// クライアントはストリームの終端を `ChannelEnd` にする
#[test]
fn client_reports_channel_end() {
    let inputs: [&[u8]; 4] = [
        b"",
        b"HTTP/1.1 200",
        b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n",
        b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nab",
    ];
    for input in inputs {
        let mut channel = MemoryChannel::new().max_read(4);
        channel.push_response(input);
        let mut client = Client::new(channel);
        client.set_request(Request::new());
        assert_eq!(client.issue().err(), Some(Error::ChannelEnd), "{input:?}");
        assert!(!client.is_channel_open());
        assert_eq!(client.channel().close_count(), 1);
    }
}

/// 完全なレスポンス (正常系)
#[test]
fn complete_body() {
    let mut parser = ResponseParser::default();
    let mut response = Response::new();
    let mut hooks = Hooks::none();
    let input = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
    let (head, body) = input.split_at(input.len() - 5);

    assert_eq!(parser.feed(head, &mut response, &mut hooks).unwrap(), Progress::Partial);
    assert_eq!(
        parser.feed(body, &mut response, &mut hooks).unwrap(),
        Progress::Complete { consumed: 5 }
    );
    assert_eq!(response.body, b"hello");
}
