//! リクエストの書き出し
//!
//! ## 概要
//!
//! [`RequestWriter`] は細かい書き込みを固定容量のチャンクバッファにまとめ、
//! バッファが溢れる前にチャネルへ書き出します。
//! 容量以上の断片はコピーせずにそのまま書き出します。
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::{Channel, ChannelAddress, MemoryChannel, RequestWriter};
//!
//! let mut channel = MemoryChannel::new();
//! channel.open(&ChannelAddress::new([127, 0, 0, 1], 80)).unwrap();
//!
//! let mut writer = RequestWriter::new(16).unwrap();
//! writer.write(&mut channel, b"GET / ").unwrap();
//! writer.write(&mut channel, b"HTTP/1.1\r\n\r\n").unwrap();
//! writer.flush(&mut channel).unwrap();
//! assert_eq!(channel.written(), b"GET / HTTP/1.1\r\n\r\n");
//! ```

use core::convert::Infallible;

use crate::channel::Channel;
use crate::config::MIN_SEND_CHUNK_LEN;
use crate::error::Error;
use crate::request::Request;

/// チャンクバッファ付きの書き出し
#[derive(Debug)]
pub struct RequestWriter {
    buf: Vec<u8>,
    capacity: usize,
}

impl Default for RequestWriter {
    /// `Config::default()` の `send_chunk_len` と同じ 512 バイト
    fn default() -> Self {
        Self {
            buf: Vec::new(),
            capacity: 512,
        }
    }
}

impl RequestWriter {
    /// 容量を指定して作成
    ///
    /// 容量が [`MIN_SEND_CHUNK_LEN`] 未満の場合は `BadOption`
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity < MIN_SEND_CHUNK_LEN {
            return Err(Error::BadOption);
        }
        Ok(Self {
            buf: Vec::new(),
            capacity,
        })
    }

    /// チャンクバッファの容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// バッファに溜まっているバイト数
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// 容量を変更
    ///
    /// 書き出していないバイトは破棄される。
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), Error> {
        if capacity < MIN_SEND_CHUNK_LEN {
            return Err(Error::BadOption);
        }
        self.buf = Vec::new();
        self.capacity = capacity;
        Ok(())
    }

    /// 書き出していないバイトを破棄
    pub fn discard(&mut self) {
        self.buf.clear();
    }

    /// バイト列を書き込む
    pub fn write<C: Channel + ?Sized>(&mut self, channel: &mut C, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }
        if self.buf.len() + data.len() > self.capacity {
            self.flush(channel)?;
        }
        if data.len() >= self.capacity {
            tracing::trace!(len = data.len(), "write span directly");
            return write_fully(channel, data);
        }
        if self.buf.capacity() < self.capacity {
            self.buf
                .try_reserve_exact(self.capacity - self.buf.len())
                .map_err(|_| Error::OutOfMemory)?;
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// バッファに溜まっているバイトを書き出す
    pub fn flush<C: Channel + ?Sized>(&mut self, channel: &mut C) -> Result<(), Error> {
        if self.buf.is_empty() {
            return Ok(());
        }
        tracing::trace!(len = self.buf.len(), "flush chunk");
        let result = write_fully(channel, &self.buf);
        self.buf.clear();
        result
    }

    /// リクエスト全体を書き込み、最後にフラッシュする
    pub fn write_request<C: Channel + ?Sized>(
        &mut self,
        channel: &mut C,
        request: &Request,
    ) -> Result<(), Error> {
        for_each_piece(request, |piece| self.write(&mut *channel, piece))?;
        self.flush(channel)
    }
}

/// 部分書き込みは `ChannelWrite` として扱う (再試行しない)
fn write_fully<C: Channel + ?Sized>(channel: &mut C, data: &[u8]) -> Result<(), Error> {
    let n = channel.write(data)?;
    if n != data.len() {
        tracing::debug!(expected = data.len(), written = n, "short write");
        return Err(Error::ChannelWrite);
    }
    Ok(())
}

/// リクエストを送信順の断片に分けて渡す
fn for_each_piece<F, E>(request: &Request, mut f: F) -> Result<(), E>
where
    F: FnMut(&[u8]) -> Result<(), E>,
{
    // Request line: METHOD SP path ["?" query] SP HTTP/version CRLF
    f(request.method().as_str().as_bytes())?;
    f(b" ")?;
    f(request.path().as_bytes())?;
    if let Some(query) = request.query() {
        f(b"?")?;
        f(query.as_bytes())?;
    }
    f(b" HTTP/")?;
    f(request.version().as_str().as_bytes())?;
    f(b"\r\n")?;

    // Headers
    if let Some(headers) = request.headers() {
        for entry in headers {
            f(entry.key().as_bytes())?;
            f(b": ")?;
            f(entry.value().as_bytes())?;
            f(b"\r\n")?;
        }
    }

    // End of headers
    f(b"\r\n")?;

    // Body
    f(request.body())
}

/// リクエストをバイト列にエンコード
///
/// ヘッダーはテーブルの内容をそのまま使う。
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut buf = Vec::new();
    let Ok(()) = for_each_piece(request, |piece| {
        buf.extend_from_slice(piece);
        Ok::<(), Infallible>(())
    });
    buf
}
