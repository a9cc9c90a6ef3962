//! IPv4 ホストパース
//!
//! ## 概要
//!
//! `Request::set_host` で使用する、ドット区切り 10 進表記の IPv4 アドレスのパーサーです。
//! 1 文字ずつ状態遷移し、範囲外の値は検出した時点でエラーにします。
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::host::parse_host;
//! use echo_http::Error;
//!
//! assert_eq!(parse_host("192.168.8.72"), Ok([192, 168, 8, 72]));
//! assert_eq!(parse_host("256.0.0.1"), Err(Error::BadHost));
//! assert_eq!(parse_host("0.04.0.0"), Err(Error::BadChar));
//! assert_eq!(parse_host("127.0.0"), Err(Error::BadFormat));
//! ```

use crate::error::Error;

/// IPv4 アドレスを 1 文字ずつ組み立てる
///
/// URL パーサーとホストパーサーで共有する。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Ipv4Builder {
    octets: [u8; 4],
    index: usize,
    value: u16,
    digits: usize,
}

impl Ipv4Builder {
    /// 数字を追加
    ///
    /// 先頭 0 の後ろに数字が続く場合は `BadChar`、255 を超えた時点で `BadHost`
    pub(crate) fn digit(&mut self, b: u8) -> Result<(), Error> {
        if self.digits == 1 && self.value == 0 {
            return Err(Error::BadChar);
        }
        let value = self.value * 10 + u16::from(b - b'0');
        if value > 255 {
            return Err(Error::BadHost);
        }
        self.value = value;
        self.digits += 1;
        Ok(())
    }

    /// `.` を追加
    ///
    /// 5 つ目のオクテットが始まる場合は `BadHost`
    pub(crate) fn dot(&mut self) -> Result<(), Error> {
        if self.digits == 0 {
            return Err(Error::BadChar);
        }
        if self.index == 3 {
            return Err(Error::BadHost);
        }
        self.octets[self.index] = self.value as u8;
        self.index += 1;
        self.value = 0;
        self.digits = 0;
        Ok(())
    }

    /// 現在のオクテットに数字が 1 つ以上あるか
    pub(crate) fn has_digits(&self) -> bool {
        self.digits > 0
    }

    /// アドレスを確定
    ///
    /// 4 つのオクテットが揃っていない場合は `BadFormat`
    pub(crate) fn finish(&self) -> Result<[u8; 4], Error> {
        if self.index != 3 || self.digits == 0 {
            return Err(Error::BadFormat);
        }
        let mut octets = self.octets;
        octets[3] = self.value as u8;
        Ok(octets)
    }
}

/// ホストパーサーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    /// オクテット先頭の数字待ち
    OctetStart,
    /// オクテットの数字を読み取り中
    Digit,
}

/// ドット区切り 10 進表記の IPv4 アドレスをパース
pub fn parse_host(input: &str) -> Result<[u8; 4], Error> {
    let mut builder = Ipv4Builder::default();
    let mut state = HostState::OctetStart;

    for b in input.bytes() {
        state = match (state, b) {
            (HostState::OctetStart | HostState::Digit, b'0'..=b'9') => {
                builder.digit(b)?;
                HostState::Digit
            }
            (HostState::Digit, b'.') => {
                builder.dot()?;
                HostState::OctetStart
            }
            _ => return Err(Error::BadChar),
        };
    }

    builder.finish()
}
