use std::collections::VecDeque;

use super::{Channel, ChannelAddress, ChannelOption};
use crate::error::Error;

/// メモリ上のレスポンスを返すチャネル
///
/// 登録したレスポンスを順番に返す。1 回の読み込みは 1 つのレスポンスをまたがない。
/// 読み切ったレスポンスは次の書き込み (次のリクエスト) で破棄され、
/// それまでの読み込みはストリーム終端 (`Ok(0)`) になる。
#[derive(Debug, Default)]
pub struct MemoryChannel {
    responses: VecDeque<Vec<u8>>,
    cursor: usize,
    max_read: Option<usize>,
    short_write: Option<usize>,
    fail_open: bool,
    is_open: bool,
    written: Vec<u8>,
    options: Vec<ChannelOption>,
    addresses: Vec<ChannelAddress>,
    open_count: usize,
    close_count: usize,
    read_count: usize,
    write_count: usize,
}

impl MemoryChannel {
    /// 空のチャネルを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// レスポンスを登録
    pub fn push_response(&mut self, response: impl Into<Vec<u8>>) {
        self.responses.push_back(response.into());
    }

    /// 1 回の読み込みで返す最大バイト数 (ビルダーパターン)
    pub fn max_read(mut self, len: usize) -> Self {
        self.max_read = Some(len.max(1));
        self
    }

    /// 書き込みで受け付ける最大バイト数を指定し、部分書き込みを発生させる
    pub fn short_write(mut self, len: usize) -> Self {
        self.short_write = Some(len);
        self
    }

    /// `open` を失敗させる
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// 開いているかどうか
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// 書き込まれたバイト列
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// 書き込まれたバイト列を取り出す
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// 設定されたオプション
    pub fn options(&self) -> &[ChannelOption] {
        &self.options
    }

    /// `open` に渡されたアドレス
    pub fn addresses(&self) -> &[ChannelAddress] {
        &self.addresses
    }

    /// `open` の呼び出し回数
    pub fn open_count(&self) -> usize {
        self.open_count
    }

    /// `close` の呼び出し回数
    pub fn close_count(&self) -> usize {
        self.close_count
    }

    /// `read` の呼び出し回数
    pub fn read_count(&self) -> usize {
        self.read_count
    }

    /// `write` の呼び出し回数
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// 未読のレスポンス数 (読みかけを含む)
    pub fn remaining_responses(&self) -> usize {
        self.responses.len()
    }

    fn discard_drained(&mut self) {
        if self
            .responses
            .front()
            .is_some_and(|r| self.cursor > 0 && self.cursor >= r.len())
        {
            self.responses.pop_front();
            self.cursor = 0;
        }
    }
}

impl Channel for MemoryChannel {
    fn open(&mut self, address: &ChannelAddress) -> Result<(), Error> {
        self.open_count += 1;
        self.addresses.push(*address);
        if self.fail_open {
            return Err(Error::ChannelOpen);
        }
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.close_count += 1;
        self.is_open = false;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.read_count += 1;
        if !self.is_open {
            return Err(Error::ChannelRead);
        }
        let Some(response) = self.responses.front() else {
            return Ok(0);
        };
        let rest = &response[self.cursor..];
        let mut n = rest.len().min(buf.len());
        if let Some(max) = self.max_read {
            n = n.min(max);
        }
        buf[..n].copy_from_slice(&rest[..n]);
        self.cursor += n;
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.write_count += 1;
        if !self.is_open {
            return Err(Error::ChannelWrite);
        }
        self.discard_drained();
        let n = self.short_write.map_or(data.len(), |max| data.len().min(max));
        self.written.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn set_option(&mut self, option: ChannelOption) -> Result<(), Error> {
        self.options.push(option);
        Ok(())
    }
}
