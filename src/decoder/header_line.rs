//! ヘッダー行

use crate::error::Error;
use crate::header::{is_key_byte, is_value_byte};
use crate::limits::ParserLimits;

/// ヘッダー行の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// 行頭 (CR なら空行)
    LineStart,
    /// キー
    Key,
    /// `:` の後の空白
    Spaces,
    /// 値
    Value,
    /// 行末の LF
    Lf,
}

/// 1 バイト進めた結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderStep {
    /// 行の途中
    Continue,
    /// 1 行読み終えた (`key()` / `value()` で取得できる)
    Line,
    /// 行頭で CR を読んだ (ヘッダー終端の空行)
    EndOfHeaders,
}

/// ヘッダー行パーサー
///
/// キーは小文字にしながらコピーする。
#[derive(Debug, Clone)]
pub(crate) struct HeaderLineParser {
    state: State,
    key: String,
    value: String,
}

impl Default for HeaderLineParser {
    fn default() -> Self {
        Self {
            state: State::LineStart,
            key: String::new(),
            value: String::new(),
        }
    }
}

impl HeaderLineParser {
    /// 1 バイト進める
    pub(crate) fn step(&mut self, b: u8, limits: &ParserLimits) -> Result<HeaderStep, Error> {
        self.state = match (self.state, b) {
            (State::LineStart, b'\r') => return Ok(HeaderStep::EndOfHeaders),
            (State::LineStart, b':') => return Err(Error::BadHeaderLine),
            (State::LineStart | State::Key, b) if is_key_byte(b) => {
                if self.state == State::LineStart {
                    self.key.clear();
                    self.value.clear();
                }
                if self.key.len() >= limits.max_header_key_len {
                    return Err(Error::BadHeaderKey);
                }
                self.key.push(char::from(b.to_ascii_lowercase()));
                State::Key
            }
            (State::Key, b':') => State::Spaces,
            (State::LineStart | State::Key, _) => return Err(Error::BadHeaderKey),
            (State::Spaces, b' ') => State::Spaces,
            (State::Spaces | State::Value, b'\r') => State::Lf,
            (State::Spaces | State::Value, b) if is_value_byte(b) => {
                if self.value.len() >= limits.max_header_value_len {
                    return Err(Error::BadHeaderValue);
                }
                self.value.push(char::from(b));
                State::Value
            }
            (State::Spaces | State::Value, _) => return Err(Error::BadHeaderValue),
            (State::Lf, b'\n') => {
                self.state = State::LineStart;
                return Ok(HeaderStep::Line);
            }
            (State::Lf, _) => return Err(Error::BadHeaderLine),
        };
        Ok(HeaderStep::Continue)
    }

    /// 読み終えた行のキー (小文字)
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    /// 読み終えた行の値
    pub(crate) fn value(&self) -> &str {
        &self.value
    }
}
