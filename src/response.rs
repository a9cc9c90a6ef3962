use core::fmt;

use crate::header::HeaderTable;
use crate::version::Version;

/// 受理するステータスコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 206 Partial Content
    PartialContent,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// まだステータス行を受信していない
    Unknown,
}

impl StatusCode {
    /// 数値から変換
    ///
    /// 受理しないコードは `None`
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            206 => Some(StatusCode::PartialContent),
            400 => Some(StatusCode::BadRequest),
            401 => Some(StatusCode::Unauthorized),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }

    /// 数値 (`Unknown` は 0)
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::PartialContent => 206,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::Unknown => 0,
        }
    }

    /// 2xx かどうか
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok | StatusCode::PartialContent)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// HTTP レスポンス
///
/// クライアントが所有し、キープアライブ中はリクエストごとにリセットして再利用する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP バージョン
    pub version: Version,
    /// ステータスコード
    pub status: StatusCode,
    /// 理由フレーズ (OK, Not Found, etc.)
    pub reason_phrase: String,
    /// ヘッダー (キーは小文字)
    pub headers: HeaderTable,
    /// Content-Length の値 (ヘッダーがない場合は 0)
    pub content_length: usize,
    /// ボディ (ボディシンク未使用時のみ保存される)
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// 空のレスポンスを作成
    pub fn new() -> Self {
        Self {
            version: Version::Unknown,
            status: StatusCode::Unknown,
            reason_phrase: String::new(),
            headers: HeaderTable::new(),
            content_length: 0,
            body: Vec::new(),
        }
    }

    /// 次のレスポンスを受信するためにリセット
    ///
    /// ヘッダーテーブルの容量は維持する。
    pub fn reset(&mut self) {
        self.version = Version::Unknown;
        self.status = StatusCode::Unknown;
        self.reason_phrase.clear();
        self.headers.reset();
        self.content_length = 0;
        self.body = Vec::new();
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// `Connection: close` を受信したかどうか
    pub fn is_connection_close(&self) -> bool {
        self.headers
            .get("connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_accepted_set() {
        for code in [200, 206, 400, 401, 404, 500] {
            assert_eq!(StatusCode::from_u16(code).map(|s| s.as_u16()), Some(code));
        }
        assert_eq!(StatusCode::from_u16(201), None);
        assert_eq!(StatusCode::from_u16(302), None);
        assert!(StatusCode::PartialContent.is_success());
        assert!(!StatusCode::NotFound.is_success());
    }

    #[test]
    fn connection_close_is_case_insensitive() {
        let mut response = Response::new();
        assert!(!response.is_connection_close());
        response.headers.add("Connection", "Close").unwrap();
        assert!(response.is_connection_close());
        response.headers.add("connection", "keep-alive").unwrap();
        assert!(!response.is_connection_close());
    }

    #[test]
    fn reset_clears_message() {
        let mut response = Response::new();
        response.status = StatusCode::Ok;
        response.version = Version::Http11;
        response.reason_phrase.push_str("OK");
        response.headers.add("server", "x").unwrap();
        response.content_length = 3;
        response.body.extend_from_slice(b"abc");

        response.reset();
        assert_eq!(response.status, StatusCode::Unknown);
        assert_eq!(response.version, Version::Unknown);
        assert!(response.reason_phrase.is_empty());
        assert!(response.headers.is_empty());
        assert_eq!(response.content_length, 0);
        assert!(response.body.is_empty());
    }
}
