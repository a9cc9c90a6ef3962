//! ヘッダーオブザーバーとボディシンク
//!
//! クロージャもそのまま渡せます。
//!
//! ```rust
//! use echo_http::{BodySink, Error, HeaderObserver};
//!
//! let mut seen = Vec::new();
//! let mut observer = |_total: usize, _index: usize, key: &str, value: &str| {
//!     seen.push(format!("{key}: {value}"));
//!     Ok::<(), Error>(())
//! };
//! observer.on_header(1, 0, "Content-Length", "0").unwrap();
//! assert_eq!(seen, ["Content-Length: 0"]);
//!
//! let mut body = Vec::new();
//! let mut sink = |_offset: usize, data: &[u8]| {
//!     body.extend_from_slice(data);
//!     Ok::<usize, Error>(data.len())
//! };
//! assert_eq!(sink.write(0, b"hello"), Ok(5));
//! ```

use crate::error::Error;

/// ヘッダーを 1 つずつ受け取るオブザーバー
pub trait HeaderObserver {
    /// ヘッダーを受け取る
    ///
    /// `total` はヘッダーの総数、`index` は 0 から始まる位置。
    /// エラーを返すとリクエストは中断される。
    fn on_header(&mut self, total: usize, index: usize, key: &str, value: &str)
    -> Result<(), Error>;
}

impl<F> HeaderObserver for F
where
    F: FnMut(usize, usize, &str, &str) -> Result<(), Error>,
{
    fn on_header(
        &mut self,
        total: usize,
        index: usize,
        key: &str,
        value: &str,
    ) -> Result<(), Error> {
        self(total, index, key, value)
    }
}

/// レスポンスボディを逐次受け取るシンク
pub trait BodySink {
    /// ボディの断片を受け取る
    ///
    /// `offset` はボディ先頭からの位置。最後に長さ 0 の呼び出しで完了を通知する。
    /// 消費したバイト数を返す。渡された長さより少ない場合は `BadBodyWrite` になる。
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<usize, Error>;
}

impl<F> BodySink for F
where
    F: FnMut(usize, &[u8]) -> Result<usize, Error>,
{
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<usize, Error> {
        self(offset, data)
    }
}
