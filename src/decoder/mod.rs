//! HTTP/1.x レスポンスパーサーモジュール
//!
//! Sans I/O 設計に基づくストリーミングパーサーを提供。
//! 受信したデータを任意の大きさで渡すことができ、1 バイトずつ状態遷移する。
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::{Hooks, Progress, Response, ResponseParser, StatusCode};
//!
//! let mut parser = ResponseParser::default();
//! let mut response = Response::new();
//! let mut hooks = Hooks::none();
//!
//! let progress = parser
//!     .feed(b"HTTP/1.1 200 OK\r\nContent-Le", &mut response, &mut hooks)
//!     .unwrap();
//! assert_eq!(progress, Progress::Partial);
//!
//! let progress = parser
//!     .feed(b"ngth: 5\r\n\r\nhello", &mut response, &mut hooks)
//!     .unwrap();
//! assert_eq!(progress, Progress::Complete { consumed: 16 });
//! assert_eq!(response.status, StatusCode::Ok);
//! assert_eq!(response.body, b"hello");
//! ```

mod header_line;
mod phase;
mod response;
mod status_line;

// 公開 API
pub use response::{Hooks, Progress, ResponseParser};
