//! ステータスライン

use crate::error::Error;
use crate::limits::ParserLimits;
use crate::response::{Response, StatusCode};
use crate::version::Version;

/// ステータスラインの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// `H` 待ち (先頭のゴミは読み捨てる)
    H,
    /// 1 つ目の `T` 待ち
    T1,
    /// 2 つ目の `T` 待ち
    T2,
    /// `P` 待ち
    P,
    /// `/` 待ち
    Slash,
    /// メジャーバージョン
    Major,
    /// `.` 待ち
    Dot,
    /// マイナーバージョン
    Minor,
    /// バージョン後の SP
    VersionSpace,
    /// ステータスコード 1 桁目
    Status1,
    /// ステータスコード 2 桁目
    Status2,
    /// ステータスコード 3 桁目
    Status3,
    /// ステータスコード後の SP
    StatusSpace,
    /// 理由フレーズ
    Reason,
    /// 行末の LF
    Lf,
}

impl State {
    /// ステータスコードより前の状態かどうか
    fn is_before_status(&self) -> bool {
        matches!(
            self,
            State::H
                | State::T1
                | State::T2
                | State::P
                | State::Slash
                | State::Major
                | State::Dot
                | State::Minor
                | State::VersionSpace
                | State::Status1
        )
    }
}

/// 理由フレーズに使用できる文字
fn is_reason_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b' ' || b == b'-'
}

/// ステータスラインパーサー
#[derive(Debug, Clone)]
pub(crate) struct StatusLineParser {
    state: State,
    major: u8,
    minor: u8,
    status: u16,
}

impl Default for StatusLineParser {
    fn default() -> Self {
        Self {
            state: State::H,
            major: 0,
            minor: 0,
            status: 0,
        }
    }
}

impl StatusLineParser {
    /// 1 バイト進める
    ///
    /// 行末まで読んだら `true` を返す。
    pub(crate) fn step(
        &mut self,
        b: u8,
        response: &mut Response,
        limits: &ParserLimits,
    ) -> Result<bool, Error> {
        loop {
            let next = match (self.state, b) {
                (State::H, b'H') => State::T1,
                (State::T1, b'T') => State::T2,
                (State::T2, b'T') => State::P,
                (State::P, b'P') => State::Slash,
                (State::Slash, b'/') => State::Major,
                (State::Major, b'0'..=b'9') => {
                    self.major = b - b'0';
                    State::Dot
                }
                (State::Dot, b'.') => State::Minor,
                (State::Minor, b'0'..=b'9') => {
                    self.minor = b - b'0';
                    State::VersionSpace
                }
                (State::VersionSpace, b' ') => {
                    let version = Version::from_digits(self.major, self.minor);
                    if version == Version::Unknown {
                        return Err(Error::BadHttpVersion);
                    }
                    response.version = version;
                    State::Status1
                }
                (State::Status1, b'1'..=b'9') => {
                    self.status = u16::from(b - b'0');
                    State::Status2
                }
                (State::H, _) => {
                    // 先頭のゴミ
                    return Ok(false);
                }
                (state, _) if state.is_before_status() => {
                    // 読み直し: 同じバイトを先頭の状態で再評価する
                    self.state = State::H;
                    continue;
                }
                (State::Status2 | State::Status3, b'0'..=b'9') => {
                    self.status = self.status * 10 + u16::from(b - b'0');
                    if self.state == State::Status2 {
                        State::Status3
                    } else {
                        State::StatusSpace
                    }
                }
                (State::StatusSpace, b' ') => {
                    response.status =
                        StatusCode::from_u16(self.status).ok_or(Error::BadStatusCode)?;
                    State::Reason
                }
                (State::Reason, b'\r') => State::Lf,
                (State::Reason, b) if is_reason_byte(b) => {
                    if response.reason_phrase.len() >= limits.max_reason_phrase_len {
                        return Err(Error::BadReasonPhrase);
                    }
                    response.reason_phrase.push(char::from(b));
                    State::Reason
                }
                (State::Reason, _) => return Err(Error::BadStatusLine),
                (State::Lf, b'\n') => {
                    self.state = State::H;
                    return Ok(true);
                }
                _ => return Err(Error::BadStatusLine),
            };
            self.state = next;
            return Ok(false);
        }
    }
}
