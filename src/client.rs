//! HTTP クライアント
//!
//! ## 概要
//!
//! [`Client`] はリクエストの送信とレスポンスの受信を 1 つのチャネル上で行います。
//! キープアライブを有効にすると、開いたチャネルを次のリクエストでも再利用します。
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::{Client, MemoryChannel, Request, StatusCode};
//!
//! let mut channel = MemoryChannel::new();
//! channel.push_response(&b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi"[..]);
//!
//! let mut client = Client::new(channel);
//! client.set_request(Request::from_url("http://127.0.0.1:8080/index.html").unwrap());
//!
//! let response = client.issue().unwrap();
//! assert_eq!(response.status, StatusCode::Ok);
//! assert_eq!(response.body, b"hi");
//! assert!(!client.is_channel_open());
//! ```

use crate::channel::{Channel, ChannelAddress, ChannelOption};
use crate::config::Config;
use crate::decoder::{Hooks, Progress, ResponseParser};
use crate::encoder::RequestWriter;
use crate::error::Error;
use crate::header::HeaderTable;
use crate::limits::ParserLimits;
use crate::observer::{BodySink, HeaderObserver};
use crate::request::{Method, Request};
use crate::response::Response;

/// User-Agent ヘッダーの値
const USER_AGENT: &str = concat!("echo_http/", env!("CARGO_PKG_VERSION"));

type BoxedObserver = Box<dyn HeaderObserver + Send>;
type BoxedSink = Box<dyn BodySink + Send>;

/// HTTP クライアント
///
/// チャネルは構築時に渡す。チャネルが `Send` ならクライアントも `Send` になる。
pub struct Client<C: Channel> {
    channel: C,
    config: Config,
    request: Option<Request>,
    response: Response,
    parser: ResponseParser,
    writer: RequestWriter,
    recv_buf: Vec<u8>,
    request_header_observer: Option<BoxedObserver>,
    response_header_observer: Option<BoxedObserver>,
    body_sink: Option<BoxedSink>,
    channel_open: bool,
    keep_alive: bool,
}

impl<C: Channel> Client<C> {
    /// デフォルト設定でクライアントを作成
    pub fn new(channel: C) -> Self {
        let limits = ParserLimits::default();
        Self {
            channel,
            config: Config::default(),
            request: None,
            response: Response::new(),
            recv_buf: vec![0; limits.recv_buf_len.max(1)],
            parser: ResponseParser::new(limits),
            writer: RequestWriter::default(),
            request_header_observer: None,
            response_header_observer: None,
            body_sink: None,
            channel_open: false,
            keep_alive: false,
        }
    }

    /// 設定を指定してクライアントを作成
    pub fn with_config(channel: C, config: Config) -> Result<Self, Error> {
        config.validate()?;
        let mut client = Self::new(channel);
        client.writer.set_capacity(config.send_chunk_len)?;
        client.config = config;
        Ok(client)
    }

    /// パーサーの制限を指定 (ビルダーパターン)
    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.recv_buf = vec![0; limits.recv_buf_len.max(1)];
        self.parser = ResponseParser::new(limits);
        self
    }

    /// 設定
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// リクエストを設定
    pub fn set_request(&mut self, request: Request) {
        self.request = Some(request);
    }

    /// リクエスト
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// リクエストへの可変参照
    pub fn request_mut(&mut self) -> Option<&mut Request> {
        self.request.as_mut()
    }

    /// リクエストを取り出す
    pub fn take_request(&mut self) -> Option<Request> {
        self.request.take()
    }

    /// 最後に受信したレスポンス
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// キープアライブを有効 / 無効にする
    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    /// キープアライブが有効かどうか
    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// チャネルが開いているかどうか
    pub fn is_channel_open(&self) -> bool {
        self.channel_open
    }

    /// 送信チャンクバッファのサイズを変更
    ///
    /// 最小値未満の場合は `BadOption`
    pub fn set_send_chunk_len(&mut self, len: usize) -> Result<(), Error> {
        self.writer.set_capacity(len)?;
        self.config.send_chunk_len = len;
        Ok(())
    }

    /// リクエストヘッダーのオブザーバーを設定
    pub fn set_request_header_observer(&mut self, observer: impl HeaderObserver + Send + 'static) {
        self.request_header_observer = Some(Box::new(observer));
    }

    /// レスポンスヘッダーのオブザーバーを設定
    pub fn set_response_header_observer(&mut self, observer: impl HeaderObserver + Send + 'static) {
        self.response_header_observer = Some(Box::new(observer));
    }

    /// ボディシンクを設定
    ///
    /// 設定するとボディは `Response::body` に保存されず、シンクへ渡される。
    pub fn set_body_sink(&mut self, sink: impl BodySink + Send + 'static) {
        self.body_sink = Some(Box::new(sink));
    }

    /// ボディシンクを解除し、ボディをバッファへ保存する
    pub fn clear_body_sink(&mut self) {
        self.body_sink = None;
    }

    /// チャネルオプションを設定
    pub fn set_channel_option(&mut self, option: ChannelOption) -> Result<(), Error> {
        self.channel.set_option(option)
    }

    /// チャネル
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// チャネルへの可変参照
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// チャネルを取り出す
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// キープアライブ中のチャネルを閉じる
    pub fn close(&mut self) -> Result<(), Error> {
        if !self.channel_open {
            return Ok(());
        }
        self.channel_open = false;
        self.channel.close()?;
        tracing::debug!("channel closed");
        Ok(())
    }

    /// リクエストを送信し、レスポンスを受信する
    ///
    /// 失敗した場合、チャネルは閉じられる。
    /// 自動で追加したヘッダーは終了時に取り除くため、
    /// 同じリクエストを再送すると現在の URL とボディから作り直される。
    pub fn issue(&mut self) -> Result<&Response, Error> {
        let Some(request) = self.request.as_mut() else {
            return Err(Error::NoRequest);
        };
        let address = request.address();
        let is_head = request.method() == Method::Head;

        let mut added = AddedHeaders::default();
        let mut result = added.apply(request, self.keep_alive);
        if result.is_ok() {
            result = self.send_and_receive(&address, is_head);
        }
        if let Some(request) = self.request.as_mut() {
            result = result.and(added.restore(request.headers_mut()));
        }
        result?;

        if self.keep_alive && !self.response.is_connection_close() {
            tracing::debug!(%address, "keep channel open");
        } else {
            if self.keep_alive {
                tracing::debug!(%address, "server requested connection close");
            }
            self.close()?;
        }
        Ok(&self.response)
    }

    /// チャネルを開いて (または再利用して) 送受信する
    fn send_and_receive(&mut self, address: &ChannelAddress, is_head: bool) -> Result<(), Error> {
        if self.channel_open {
            tracing::debug!(%address, "reuse open channel");
        } else {
            self.channel.open(address)?;
            self.channel_open = true;
            tracing::debug!(%address, "channel opened");
        }

        if let Err(e) = self.exchange(is_head) {
            self.writer.discard();
            self.close_quietly();
            return Err(e);
        }
        Ok(())
    }

    /// 送信と受信
    fn exchange(&mut self, is_head: bool) -> Result<(), Error> {
        let request = self.request.as_mut().ok_or(Error::NoRequest)?;

        // 送信時のみキーを先頭大文字にする
        let headers = request.headers_mut();
        headers.canonicalize_keys();
        let result = notify_headers(self.request_header_observer.as_mut(), request)
            .and_then(|()| self.writer.write_request(&mut self.channel, request));
        request.headers_mut().lowercase_keys();
        result?;

        self.response.reset();
        self.parser.reset();
        self.parser.set_expect_no_body(is_head);

        let mut hooks = Hooks {
            header_observer: observer_ref(&mut self.response_header_observer),
            body_sink: sink_ref(&mut self.body_sink),
        };
        loop {
            let n = self.channel.read(&mut self.recv_buf)?;
            if n == 0 {
                return Err(Error::ChannelEnd);
            }
            match self
                .parser
                .feed(&self.recv_buf[..n], &mut self.response, &mut hooks)?
            {
                Progress::Partial => {}
                Progress::Complete { consumed } => {
                    if consumed < n {
                        tracing::trace!(ignored = n - consumed, "bytes after response ignored");
                    }
                    return Ok(());
                }
            }
        }
    }

    /// エラー時のクローズ (失敗しても元のエラーを優先する)
    fn close_quietly(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "failed to close channel");
        }
    }
}

/// 送信のためにクライアントが追加したヘッダー
#[derive(Debug, Default)]
struct AddedHeaders {
    keys: Vec<&'static str>,
    /// キープアライブで上書きした `connection` の元の値
    replaced_connection: Option<String>,
}

impl AddedHeaders {
    /// 送信前のヘッダー調整
    ///
    /// キーを小文字にそろえ、`host` / `user-agent` / `content-length` がなければ追加する。
    fn apply(&mut self, request: &mut Request, keep_alive: bool) -> Result<(), Error> {
        let host = request.address().to_string();
        let content_length = request.body().len().to_string();
        let headers = request.headers_mut();
        headers.lowercase_keys();
        for (key, value) in [
            ("host", host.as_str()),
            ("user-agent", USER_AGENT),
            ("content-length", content_length.as_str()),
        ] {
            if !headers.contains(key) {
                headers.add(key, value)?;
                self.keys.push(key);
            }
        }
        if keep_alive {
            match headers.get("connection") {
                Some(value) => self.replaced_connection = Some(value.to_string()),
                None => self.keys.push("connection"),
            }
            headers.add("connection", "keep-alive")?;
        }
        Ok(())
    }

    /// 呼び出し側が設定したヘッダーだけに戻す
    fn restore(self, headers: &mut HeaderTable) -> Result<(), Error> {
        for key in self.keys {
            headers.remove(key);
        }
        if let Some(value) = self.replaced_connection {
            // 上書きは同じ位置に入る
            headers.add("connection", &value)?;
        }
        Ok(())
    }
}

fn notify_headers(observer: Option<&mut BoxedObserver>, request: &Request) -> Result<(), Error> {
    let (Some(observer), Some(headers)) = (observer, request.headers()) else {
        return Ok(());
    };
    let total = headers.len();
    for (index, entry) in headers.iter().enumerate() {
        observer.on_header(total, index, entry.key(), entry.value())?;
    }
    Ok(())
}

fn observer_ref(observer: &mut Option<BoxedObserver>) -> Option<&mut dyn HeaderObserver> {
    match observer {
        Some(observer) => Some(&mut **observer as &mut dyn HeaderObserver),
        None => None,
    }
}

fn sink_ref(sink: &mut Option<BoxedSink>) -> Option<&mut dyn BodySink> {
    match sink {
        Some(sink) => Some(&mut **sink as &mut dyn BodySink),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::channel::MemoryChannel;
    use crate::response::StatusCode;

    const OK: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";

    fn client_with(responses: &[&[u8]]) -> Client<MemoryChannel> {
        let mut channel = MemoryChannel::new();
        for response in responses {
            channel.push_response(response.to_vec());
        }
        let mut client = Client::new(channel);
        client.set_request(Request::from_url("http://127.0.0.1:8080/index.html").unwrap());
        client
    }

    #[test]
    fn no_request() {
        let mut client = Client::new(MemoryChannel::new());
        assert_eq!(client.issue().err(), Some(Error::NoRequest));
        assert_eq!(client.channel().open_count(), 0);
    }

    #[test]
    fn issue_opens_and_closes() {
        let mut client = client_with(&[OK]);
        let response = client.issue().unwrap();
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.body, b"hello");
        assert!(!client.is_channel_open());
        assert_eq!(client.channel().open_count(), 1);
        assert_eq!(client.channel().close_count(), 1);
    }

    #[test]
    fn request_headers_are_augmented() {
        let mut client = client_with(&[OK]);
        client.issue().unwrap();
        let written = String::from_utf8(client.channel().written().to_vec()).unwrap();
        assert_eq!(
            written,
            format!(
                "GET /index.html HTTP/1.1\r\nHost: 127.0.0.1:8080\r\nUser-Agent: {}\r\nContent-Length: 0\r\n\r\n",
                USER_AGENT
            )
        );
        // 追加したヘッダーは送信後に取り除かれる
        let headers = client.request().unwrap().headers().unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn caller_headers_are_kept() {
        let mut client = client_with(&[OK]);
        let request = client.request_mut().unwrap();
        request.headers_mut().add("HOST", "10.0.0.1").unwrap();
        request.headers_mut().add("X-Trace-Id", "abc").unwrap();
        client.issue().unwrap();
        let written = String::from_utf8(client.channel().written().to_vec()).unwrap();
        assert!(written.contains("\r\nHost: 10.0.0.1\r\n"));
        assert!(written.contains("\r\nX-Trace-Id: abc\r\n"));
        assert_eq!(written.matches("Host:").count(), 1);

        // 呼び出し側のヘッダーは小文字のキーで残る
        let keys: Vec<_> = client
            .request()
            .unwrap()
            .headers()
            .unwrap()
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        assert_eq!(keys, ["host", "x-trace-id"]);
    }

    #[test]
    fn reused_request_follows_new_url_and_body() {
        let mut client = client_with(&[OK, OK]);
        client.request_mut().unwrap().set_body(b"x".to_vec());
        client.issue().unwrap();
        let first = String::from_utf8(client.channel_mut().take_written()).unwrap();
        assert!(first.contains("\r\nHost: 127.0.0.1:8080\r\n"));
        assert!(first.ends_with("\r\nContent-Length: 1\r\n\r\nx"));

        let request = client.request_mut().unwrap();
        request.set_body(b"hello".to_vec());
        request.set_url("http://10.0.0.9:81/b").unwrap();
        client.issue().unwrap();
        let second = String::from_utf8(client.channel_mut().take_written()).unwrap();
        assert_eq!(
            second,
            format!(
                "GET /b HTTP/1.1\r\nHost: 10.0.0.9:81\r\nUser-Agent: {}\r\nContent-Length: 5\r\n\r\nhello",
                USER_AGENT
            )
        );
        assert_eq!(
            client.channel().addresses(),
            &[
                ChannelAddress::new([127, 0, 0, 1], 8080),
                ChannelAddress::new([10, 0, 0, 9], 81)
            ]
        );
    }

    #[test]
    fn keep_alive_header_follows_setting() {
        let mut client = client_with(&[OK, OK]);
        client.set_keep_alive(true);
        client.issue().unwrap();
        let first = String::from_utf8(client.channel_mut().take_written()).unwrap();
        assert!(first.contains("\r\nConnection: keep-alive\r\n"));
        assert!(!client.request().unwrap().headers().unwrap().contains("connection"));

        client.set_keep_alive(false);
        client.issue().unwrap();
        let second = String::from_utf8(client.channel_mut().take_written()).unwrap();
        assert!(!second.contains("Connection:"));
        assert!(!client.is_channel_open());
    }

    #[test]
    fn caller_connection_value_is_restored() {
        let mut client = client_with(&[OK]);
        client.set_keep_alive(true);
        let request = client.request_mut().unwrap();
        request.headers_mut().add("Connection", "close").unwrap();
        request.headers_mut().add("Accept", "*/*").unwrap();
        client.issue().unwrap();

        let written = String::from_utf8(client.channel().written().to_vec()).unwrap();
        assert!(written.contains("\r\nConnection: keep-alive\r\n"));
        assert!(!written.contains("Connection: close"));

        let headers = client.request().unwrap().headers().unwrap();
        let entries: Vec<_> = headers
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().to_string()))
            .collect();
        assert_eq!(
            entries,
            [
                ("connection".to_string(), "close".to_string()),
                ("accept".to_string(), "*/*".to_string())
            ]
        );
    }

    #[test]
    fn open_failure_restores_headers() {
        let mut client = Client::new(MemoryChannel::new().fail_open());
        client.set_request(Request::new());
        assert_eq!(client.issue().err(), Some(Error::ChannelOpen));
        assert!(client.request().unwrap().headers().unwrap().is_empty());
    }

    #[test]
    fn keep_alive_reuses_channel() {
        let mut client = client_with(&[OK, OK]);
        client.set_keep_alive(true);
        client.issue().unwrap();
        assert!(client.is_channel_open());
        client.issue().unwrap();
        assert!(client.is_channel_open());
        assert_eq!(client.channel().open_count(), 1);
        assert_eq!(client.channel().close_count(), 0);

        let written = String::from_utf8(client.channel().written().to_vec()).unwrap();
        assert_eq!(written.matches("Connection: keep-alive\r\n").count(), 2);

        client.close().unwrap();
        assert!(!client.is_channel_open());
        assert_eq!(client.channel().close_count(), 1);
    }

    #[test]
    fn connection_close_ends_keep_alive() {
        let close: &[u8] = b"HTTP/1.1 200 OK\r\nConnection: CLOSE\r\nContent-Length: 0\r\n\r\n";
        let mut client = client_with(&[close, OK]);
        client.set_keep_alive(true);
        client.issue().unwrap();
        assert!(!client.is_channel_open());
        client.issue().unwrap();
        assert_eq!(client.channel().open_count(), 2);
    }

    #[test]
    fn failure_closes_channel() {
        let mut client = client_with(&[&b"HTTP/1.1 302 Found\r\n\r\n"[..]]);
        client.set_keep_alive(true);
        assert_eq!(client.issue().err(), Some(Error::BadStatusCode));
        assert!(!client.is_channel_open());
        assert_eq!(client.channel().close_count(), 1);
    }

    #[test]
    fn truncated_response_is_channel_end() {
        let mut client = client_with(&[&b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc"[..]]);
        assert_eq!(client.issue().err(), Some(Error::ChannelEnd));
        assert!(!client.is_channel_open());
    }

    #[test]
    fn open_failure() {
        let mut client = Client::new(MemoryChannel::new().fail_open());
        client.set_request(Request::new());
        assert_eq!(client.issue().err(), Some(Error::ChannelOpen));
        assert!(!client.is_channel_open());
        assert_eq!(client.channel().close_count(), 0);
    }

    #[test]
    fn head_request_skips_body() {
        let mut client = client_with(&[&b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n"[..]]);
        client.request_mut().unwrap().set_method(Method::Head);
        let response = client.issue().unwrap();
        assert_eq!(response.content_length, 100);
        assert!(response.body.is_empty());
    }

    #[test]
    fn observers_and_sink() {
        let request_keys = Arc::new(Mutex::new(Vec::new()));
        let response_keys = Arc::new(Mutex::new(Vec::new()));
        let body = Arc::new(Mutex::new(Vec::new()));

        let mut client = client_with(&[OK]);
        let keys = Arc::clone(&request_keys);
        client.set_request_header_observer(move |_: usize, _: usize, key: &str, _: &str| {
            keys.lock().unwrap().push(key.to_string());
            Ok::<(), Error>(())
        });
        let keys = Arc::clone(&response_keys);
        client.set_response_header_observer(move |_: usize, _: usize, key: &str, _: &str| {
            keys.lock().unwrap().push(key.to_string());
            Ok::<(), Error>(())
        });
        let sink = Arc::clone(&body);
        client.set_body_sink(move |_: usize, data: &[u8]| {
            sink.lock().unwrap().extend_from_slice(data);
            Ok::<usize, Error>(data.len())
        });

        let response = client.issue().unwrap();
        assert!(response.body.is_empty());
        assert_eq!(*body.lock().unwrap(), b"hello");
        assert_eq!(
            *request_keys.lock().unwrap(),
            ["Host", "User-Agent", "Content-Length"]
        );
        assert_eq!(*response_keys.lock().unwrap(), ["content-length"]);
    }

    #[test]
    fn observer_error_aborts_before_send() {
        let mut client = client_with(&[OK]);
        client.set_request_header_observer(|_: usize, _: usize, _: &str, _: &str| {
            Err::<(), Error>(Error::Hook("cancel".to_string()))
        });
        assert_eq!(client.issue().err(), Some(Error::Hook("cancel".to_string())));
        assert!(client.channel().written().is_empty());
        assert!(!client.is_channel_open());
    }

    #[test]
    fn send_chunk_len() {
        let mut client = client_with(&[OK]);
        assert_eq!(client.set_send_chunk_len(8), Err(Error::BadOption));
        client.set_send_chunk_len(16).unwrap();
        client.issue().unwrap();
        assert!(client.channel().write_count() > 1);
    }

    #[test]
    fn channel_option_passthrough() {
        let mut client = client_with(&[]);
        client
            .set_channel_option(ChannelOption::SyncReadWrite(true))
            .unwrap();
        assert_eq!(client.channel().options(), &[ChannelOption::SyncReadWrite(true)]);
    }

    #[test]
    fn client_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Client<MemoryChannel>>();
    }
}
