//! # echo_http
//!
//! 組み込み向けの HTTP/1.x クライアントエンジン
//!
//! ## 特徴
//!
//! - **トランスポート非依存**: ソケットや TLS は [`Channel`] トレイトで差し替える
//! - **ストリーミングパース**: レスポンスを任意の大きさに分割して受信できる
//! - **キープアライブ**: 1 つのチャネルを複数のリクエストで再利用する
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::{Client, MemoryChannel, Request, StatusCode};
//!
//! // テスト用のチャネルにレスポンスを用意
//! let mut channel = MemoryChannel::new().max_read(7);
//! channel.push_response(&b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello"[..]);
//!
//! let mut client = Client::new(channel);
//! let request = Request::from_url("http://127.0.0.1:8080/index.html")
//!     .unwrap()
//!     .with_header("Accept", "*/*")
//!     .unwrap();
//! client.set_request(request);
//!
//! let response = client.issue().unwrap();
//! assert_eq!(response.status, StatusCode::Ok);
//! assert_eq!(response.body, b"hello");
//!
//! // 送信したリクエスト
//! let written = String::from_utf8(client.channel().written().to_vec()).unwrap();
//! assert!(written.starts_with("GET /index.html HTTP/1.1\r\nAccept: */*\r\nHost: 127.0.0.1:8080\r\n"));
//! ```

pub mod channel;
mod client;
mod config;
mod decoder;
mod encoder;
mod error;
pub mod header;
pub mod host;
mod limits;
mod observer;
mod request;
mod response;
pub mod url;
mod version;

pub use channel::{Channel, ChannelAddress, ChannelOption, FileChannel, MemoryChannel, TcpChannel};
pub use client::Client;
pub use config::{Config, MIN_SEND_CHUNK_LEN};
pub use decoder::{Hooks, Progress, ResponseParser};
pub use encoder::{RequestWriter, encode_request};
pub use error::Error;
pub use header::{HeaderEntry, HeaderTable};
pub use limits::ParserLimits;
pub use observer::{BodySink, HeaderObserver};
pub use request::{Method, Request, Scheme};
pub use response::{Response, StatusCode};
pub use url::Url;
pub use version::Version;
