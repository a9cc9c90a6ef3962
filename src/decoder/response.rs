//! HTTP レスポンスパーサー

use crate::error::Error;
use crate::limits::ParserLimits;
use crate::observer::{BodySink, HeaderObserver};
use crate::response::Response;

use super::header_line::{HeaderLineParser, HeaderStep};
use super::phase::Phase;
use super::status_line::StatusLineParser;

/// パースの進捗
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// 追加のデータが必要 (渡したデータはすべて消費済み)
    Partial,
    /// レスポンスの受信が完了した
    ///
    /// `consumed` は今回渡したデータのうち消費したバイト数。
    Complete { consumed: usize },
}

/// パース中に呼び出すフック
///
/// ボディシンクがない場合、ボディは `Response::body` に保存される。
#[derive(Default)]
pub struct Hooks<'a> {
    /// レスポンスヘッダーのオブザーバー
    pub header_observer: Option<&'a mut dyn HeaderObserver>,
    /// ボディシンク
    pub body_sink: Option<&'a mut dyn BodySink>,
}

impl<'a> Hooks<'a> {
    /// フックなし
    pub fn none() -> Self {
        Self::default()
    }

    /// ボディシンクを指定
    pub fn with_body_sink(mut self, sink: &'a mut dyn BodySink) -> Self {
        self.body_sink = Some(sink);
        self
    }

    /// ヘッダーオブザーバーを指定
    pub fn with_header_observer(mut self, observer: &'a mut dyn HeaderObserver) -> Self {
        self.header_observer = Some(observer);
        self
    }
}

/// HTTP レスポンスパーサー (Sans I/O)
///
/// 任意の位置で分割されたデータを順に渡すことができ、状態は呼び出しをまたいで保持される。
#[derive(Debug, Clone)]
pub struct ResponseParser {
    limits: ParserLimits,
    phase: Phase,
    status_line: StatusLineParser,
    header_line: HeaderLineParser,
    expect_no_body: bool,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(ParserLimits::default())
    }
}

impl ResponseParser {
    /// 制限を指定してパーサーを作成
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            limits,
            phase: Phase::StatusLine,
            status_line: StatusLineParser::default(),
            header_line: HeaderLineParser::default(),
            expect_no_body: false,
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// HEAD リクエストへのレスポンスとしてパース (ボディなし)
    pub fn set_expect_no_body(&mut self, expect_no_body: bool) {
        self.expect_no_body = expect_no_body;
    }

    /// 次のレスポンスのためにリセット
    ///
    /// `set_expect_no_body` の設定もクリアされる。
    pub fn reset(&mut self) {
        self.phase = Phase::StatusLine;
        self.status_line = StatusLineParser::default();
        self.header_line = HeaderLineParser::default();
        self.expect_no_body = false;
    }

    /// 完了したかどうか
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }

    /// データを渡してパースを進める
    ///
    /// エラーが返った場合、`response` の内容は途中までのものになる。
    pub fn feed(
        &mut self,
        data: &[u8],
        response: &mut Response,
        hooks: &mut Hooks<'_>,
    ) -> Result<Progress, Error> {
        let mut pos = 0;
        while pos < data.len() {
            match self.phase {
                Phase::StatusLine => {
                    if self.status_line.step(data[pos], response, &self.limits)? {
                        self.enter(Phase::HeaderLines);
                    }
                    pos += 1;
                }
                Phase::HeaderLines => {
                    match self.header_line.step(data[pos], &self.limits)? {
                        HeaderStep::Continue => {}
                        HeaderStep::Line => self.insert_header(response)?,
                        HeaderStep::EndOfHeaders => self.enter(Phase::EmptyLine),
                    }
                    pos += 1;
                }
                Phase::EmptyLine => {
                    if data[pos] != b'\n' {
                        return Err(Error::BadEmptyLine);
                    }
                    pos += 1;
                    self.finish_headers(response, hooks)?;
                }
                Phase::BodySave { remaining } => {
                    let n = remaining.min(data.len() - pos);
                    response.body.extend_from_slice(&data[pos..pos + n]);
                    pos += n;
                    if remaining == n {
                        self.enter(Phase::Done);
                    } else {
                        self.phase = Phase::BodySave {
                            remaining: remaining - n,
                        };
                    }
                }
                Phase::BodyWrite { offset, remaining } => {
                    let n = remaining.min(data.len() - pos);
                    write_body(hooks, offset, &data[pos..pos + n])?;
                    pos += n;
                    if remaining == n {
                        // 完了通知
                        write_body(hooks, offset + n, &[])?;
                        self.enter(Phase::Done);
                    } else {
                        self.phase = Phase::BodyWrite {
                            offset: offset + n,
                            remaining: remaining - n,
                        };
                    }
                }
                Phase::Done => break,
            }
            if self.phase == Phase::Done {
                return Ok(Progress::Complete { consumed: pos });
            }
        }

        if self.phase == Phase::Done {
            Ok(Progress::Complete { consumed: pos })
        } else {
            Ok(Progress::Partial)
        }
    }

    fn enter(&mut self, phase: Phase) {
        tracing::trace!(?phase, "response phase");
        self.phase = phase;
    }

    fn insert_header(&mut self, response: &mut Response) -> Result<(), Error> {
        let key = self.header_line.key();
        let value = self.header_line.value();
        if key == "content-length" {
            response.content_length = parse_content_length(value)?;
        }
        response.headers.insert(key, value)?;
        if response.headers.len() > self.limits.max_headers_count {
            return Err(Error::TooManyHeaders {
                count: response.headers.len(),
                limit: self.limits.max_headers_count,
            });
        }
        Ok(())
    }

    /// 空行を読み終えた後の処理
    fn finish_headers(&mut self, response: &mut Response, hooks: &mut Hooks<'_>) -> Result<(), Error> {
        if let Some(observer) = hooks.header_observer.as_deref_mut() {
            let total = response.headers.len();
            for (index, entry) in response.headers.iter().enumerate() {
                observer.on_header(total, index, entry.key(), entry.value())?;
            }
        }

        if self.expect_no_body {
            self.enter(Phase::Done);
            return Ok(());
        }

        let length = response.content_length;
        if hooks.body_sink.is_some() {
            if length == 0 {
                write_body(hooks, 0, &[])?;
                self.enter(Phase::Done);
            } else {
                self.enter(Phase::BodyWrite {
                    offset: 0,
                    remaining: length,
                });
            }
            return Ok(());
        }

        if length > self.limits.max_body_size {
            return Err(Error::BodyTooLarge {
                size: length,
                limit: self.limits.max_body_size,
            });
        }
        if length == 0 {
            self.enter(Phase::Done);
            return Ok(());
        }
        response
            .body
            .try_reserve_exact(length)
            .map_err(|_| Error::OutOfMemory)?;
        self.enter(Phase::BodySave { remaining: length });
        Ok(())
    }
}

/// ボディシンクへ渡し、すべて消費されたか確認する
fn write_body(hooks: &mut Hooks<'_>, offset: usize, data: &[u8]) -> Result<(), Error> {
    let Some(sink) = hooks.body_sink.as_deref_mut() else {
        return Ok(());
    };
    let n = sink.write(offset, data)?;
    if n != data.len() {
        return Err(Error::BadBodyWrite);
    }
    Ok(())
}

/// Content-Length の値 (数字のみ)
fn parse_content_length(value: &str) -> Result<usize, Error> {
    if value.is_empty() {
        return Err(Error::BadHeaderValue);
    }
    value.bytes().try_fold(0usize, |acc, b| {
        if !b.is_ascii_digit() {
            return Err(Error::BadHeaderValue);
        }
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(b - b'0')))
            .ok_or(Error::BadHeaderValue)
    })
}
