//! クライアントの送受信テスト
//!
//! メモリ、ファイル、TCP の各チャネルでリクエストの送信とレスポンスの受信を確認する。

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use echo_http::{
    ChannelOption, Client, Config, Error, FileChannel, MemoryChannel, Method, ParserLimits,
    Request, StatusCode, TcpChannel,
};

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 13\r\nServer: echo\r\n\r\nHello, World!";

/// 1 回の読み込みサイズを変えても結果は同じ
#[test]
fn read_size_does_not_change_result() {
    let mut expected = None;
    for max_read in 1..=RESPONSE.len() {
        let mut channel = MemoryChannel::new().max_read(max_read);
        channel.push_response(RESPONSE);
        let mut client = Client::new(channel);
        client.set_request(Request::from_url("127.0.0.1/").unwrap());

        let response = client.issue().unwrap().clone();
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.body, b"Hello, World!");
        match &expected {
            None => expected = Some(response),
            Some(expected) => assert_eq!(&response, expected, "max_read = {max_read}"),
        }
    }
}

/// 受信バッファが小さくても受信できる
#[test]
fn small_receive_buffer() {
    let mut channel = MemoryChannel::new();
    channel.push_response(RESPONSE);
    let limits = ParserLimits {
        recv_buf_len: 3,
        ..ParserLimits::default()
    };
    let mut client = Client::new(channel).with_limits(limits);
    client.set_request(Request::new());
    client.issue().unwrap();
    assert_eq!(client.response().body, b"Hello, World!");
    // 3 バイトずつ読み込む
    assert_eq!(client.channel().read_count(), RESPONSE.len().div_ceil(3));
}

/// ボディが空ならシンクを 1 回だけ呼び、それ以上読み込まない
#[test]
fn empty_body_stops_reading() {
    const EMPTY: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n";
    let mut channel = MemoryChannel::new().max_read(7);
    channel.push_response(EMPTY);
    channel.push_response(RESPONSE);
    let mut client = Client::new(channel);
    client.set_keep_alive(true);
    client.set_request(Request::from_url("http://127.0.0.1:8080/").unwrap());

    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    client.set_body_sink(move |offset: usize, data: &[u8]| {
        sink.lock().unwrap().push((offset, data.len()));
        Ok::<usize, Error>(data.len())
    });

    let response = client.issue().unwrap();
    assert_eq!(response.content_length, 0);
    assert_eq!(*calls.lock().unwrap(), [(0, 0)]);
    assert_eq!(client.channel().read_count(), EMPTY.len().div_ceil(7));
    // 次のレスポンスには手を付けていない
    assert_eq!(client.channel().remaining_responses(), 2);
    assert!(client.is_channel_open());
}

/// HEAD ではボディを読み込まない
#[test]
fn head_reads_headers_only() {
    const HEAD: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 13\r\n\r\n";
    let mut channel = MemoryChannel::new().max_read(5);
    channel.push_response(HEAD);
    let mut client = Client::new(channel);
    client.set_request(
        Request::from_url("http://127.0.0.1:8080/")
            .unwrap()
            .with_method(Method::Head),
    );

    let response = client.issue().unwrap();
    assert_eq!(response.content_length, 13);
    assert!(response.body.is_empty());
    // 13 バイトのボディを待つと読み込みが増えて ChannelEnd になる
    assert_eq!(client.channel().read_count(), HEAD.len().div_ceil(5));
    assert!(!client.is_channel_open());
}

/// キープアライブで複数のリクエストを送る
#[test]
fn keep_alive_sequence() {
    let mut channel = MemoryChannel::new().max_read(10);
    for i in 0..5 {
        channel.push_response(format!(
            "HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\n{i}"
        ));
    }
    let mut client = Client::new(channel);
    client.set_keep_alive(true);
    client.set_request(Request::from_url("http://10.0.0.1:8080/").unwrap());

    for i in 0..5 {
        let path = format!("/item/{i}");
        client.request_mut().unwrap().set_path(&path).unwrap();
        let response = client.issue().unwrap();
        assert_eq!(response.body, i.to_string().as_bytes());
    }
    assert_eq!(client.channel().open_count(), 1);
    assert!(client.is_channel_open());

    client.close().unwrap();
    assert_eq!(client.channel().close_count(), 1);

    let written = String::from_utf8(client.channel().written().to_vec()).unwrap();
    for i in 0..5 {
        assert!(written.contains(&format!("GET /item/{i} HTTP/1.1\r\n")));
    }
}

/// キープアライブを無効にすると毎回開き直す
#[test]
fn without_keep_alive_reopens() {
    let mut channel = MemoryChannel::new();
    channel.push_response(RESPONSE);
    channel.push_response(RESPONSE);
    let mut client = Client::new(channel);
    client.set_request(Request::new());
    client.issue().unwrap();
    client.issue().unwrap();
    assert_eq!(client.channel().open_count(), 2);
    assert_eq!(client.channel().close_count(), 2);
    assert!(!client.channel().written().windows(10).any(|w| w == b"Connection"));
}

/// POST のボディはチャンクに分けて送信される
#[test]
fn post_body_is_chunked() {
    let mut channel = MemoryChannel::new();
    channel.push_response(RESPONSE);
    let config = Config {
        send_chunk_len: 32,
        ..Config::default()
    };
    let mut client = Client::with_config(channel, config).unwrap();
    let body = vec![b'a'; 100];
    let request = Request::from_url("http://127.0.0.1:8080/upload")
        .unwrap()
        .with_method(Method::Post)
        .with_body(body.clone());
    client.set_request(request);
    client.issue().unwrap();

    let written = client.channel().written();
    assert!(written.starts_with(b"POST /upload HTTP/1.1\r\n"));
    assert!(written.ends_with(&body));
    let text = String::from_utf8_lossy(written);
    assert!(text.contains("\r\nContent-Length: 100\r\n"));
    assert!(client.channel().write_count() >= 4);
}

/// 不正な設定
#[test]
fn invalid_config() {
    let config = Config {
        send_chunk_len: 4,
        ..Config::default()
    };
    assert!(matches!(
        Client::with_config(MemoryChannel::new(), config),
        Err(Error::BadOption)
    ));
}

/// 保存済みのレスポンスファイルを再生する
#[test]
fn file_channel_replay() {
    let path = std::env::temp_dir().join(format!(
        "echo_http_test_client_{}.bin",
        std::process::id()
    ));
    std::fs::write(&path, RESPONSE).unwrap();

    let body = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&body);
    let mut client = Client::new(FileChannel::new(&path));
    client.set_body_sink(move |offset: usize, data: &[u8]| {
        let mut body = sink.lock().unwrap();
        assert_eq!(offset, body.len());
        body.extend_from_slice(data);
        Ok::<usize, Error>(data.len())
    });
    client.set_request(
        Request::from_url("192.168.8.72:8080/api/3/query-status?name=hello&age=18").unwrap(),
    );
    client.issue().unwrap();

    assert_eq!(*body.lock().unwrap(), b"Hello, World!");
    let written = String::from_utf8(client.channel().written().to_vec()).unwrap();
    assert!(written.starts_with("GET /api/3/query-status?name=hello&age=18 HTTP/1.1\r\n"));
    assert!(written.contains("\r\nHost: 192.168.8.72:8080\r\n"));

    std::fs::remove_file(&path).unwrap();
}

/// TCP 上でキープアライブを使う
#[test]
fn tcp_keep_alive() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        let mut requests = Vec::new();
        for reply in [
            &b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\none"[..],
            &b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 3\r\n\r\ntwo"[..],
        ] {
            // リクエストは空行で終わる (ボディなし)
            let mut request = Vec::new();
            let mut byte = [0u8; 1];
            while !request.ends_with(b"\r\n\r\n") {
                socket.read_exact(&mut byte).unwrap();
                request.push(byte[0]);
            }
            requests.push(String::from_utf8(request).unwrap());
            socket.write_all(reply).unwrap();
        }
        requests
    });

    let mut client = Client::new(TcpChannel::new().connect_timeout(Duration::from_secs(5)));
    client
        .set_channel_option(ChannelOption::ReadWriteTimeout(Some(Duration::from_secs(5))))
        .unwrap();
    client.set_keep_alive(true);
    client.set_request(Request::from_url(&format!("http://127.0.0.1:{port}/first")).unwrap());

    assert_eq!(client.issue().unwrap().body, b"one");
    assert!(client.is_channel_open());

    client.request_mut().unwrap().set_path("/second").unwrap();
    assert_eq!(client.issue().unwrap().body, b"two");
    // サーバーが Connection: close を返した
    assert!(!client.is_channel_open());

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("GET /first HTTP/1.1\r\n"));
    assert!(requests[1].starts_with("GET /second HTTP/1.1\r\n"));
    assert!(requests[1].contains("\r\nConnection: keep-alive\r\n"));
}
