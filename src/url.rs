//! URL パース
//!
//! ## 概要
//!
//! `scheme://a.b.c.d:port/path?query` 形式の URL を 1 文字ずつ状態遷移してパースします。
//! ホストは IPv4 アドレスのみ対応しており、名前解決は行いません。
//!
//! 省略された要素は [`Config`] のデフォルト値で補われます。
//!
//! - スキーム省略時: `Config::default_scheme`
//! - ポート省略時: スキームごとのデフォルトポート (80 / 443)
//! - パス省略時: `/`
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::{Config, Scheme, Url};
//!
//! let config = Config::default();
//! let url = Url::parse("http://127.0.0.1:8080/index.html?lang=ja", &config).unwrap();
//! assert_eq!(url.scheme(), Scheme::Http);
//! assert_eq!(url.ip(), [127, 0, 0, 1]);
//! assert_eq!(url.port(), 8080);
//! assert_eq!(url.path(), "/index.html");
//! assert_eq!(url.query(), Some("lang=ja"));
//!
//! // スキームとポートを省略
//! let url = Url::parse("10.0.0.1/status", &config).unwrap();
//! assert_eq!(url.scheme(), Scheme::Http);
//! assert_eq!(url.port(), 80);
//! ```

use core::fmt;

use crate::channel::ChannelAddress;
use crate::config::Config;
use crate::error::Error;
use crate::host::Ipv4Builder;
use crate::request::Scheme;

/// unreserved 文字 (RFC 3986)
fn is_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// sub-delims 文字 (RFC 3986)
fn is_sub_delim(c: u8) -> bool {
    matches!(
        c,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

/// パスに使用できる文字
fn is_path_byte(c: u8) -> bool {
    is_unreserved(c) || is_sub_delim(c) || matches!(c, b':' | b'@' | b'/' | b'%')
}

/// クエリに使用できる文字
fn is_query_byte(c: u8) -> bool {
    is_path_byte(c) || c == b'?'
}

/// ポート番号を 1 文字ずつ組み立てる
#[derive(Debug, Default)]
struct PortBuilder {
    value: u32,
    digits: usize,
}

impl PortBuilder {
    fn digit(&mut self, b: u8) -> Result<(), Error> {
        if self.digits == 1 && self.value == 0 {
            return Err(Error::BadChar);
        }
        let value = self.value * 10 + u32::from(b - b'0');
        if value > u32::from(u16::MAX) {
            return Err(Error::BadPort);
        }
        self.value = value;
        self.digits += 1;
        Ok(())
    }

    fn finish(&self) -> u16 {
        self.value as u16
    }
}

/// URL パーサーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlState {
    /// 先頭 (スキームまたはアドレス)
    Start,
    /// スキーム文字
    Scheme,
    /// `:` の後の 1 つ目の `/`
    SchemeSlash,
    /// 2 つ目の `/`
    SchemeSlashSlash,
    /// オクテット先頭
    AddressStart,
    /// オクテットの数字
    AddressDigit,
    /// `:` の後のポート先頭
    PortStart,
    /// ポートの数字
    PortDigit,
    /// パス
    Path,
    /// クエリ
    Query,
}

/// パース済み URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    scheme: Scheme,
    address: ChannelAddress,
    path: String,
    query: Option<String>,
}

impl Url {
    /// URL をパース
    pub fn parse(input: &str, config: &Config) -> Result<Self, Error> {
        let bytes = input.as_bytes();
        let mut state = UrlState::Start;
        let mut scheme = None;
        let mut builder = Ipv4Builder::default();
        let mut ip = None;
        let mut port = PortBuilder::default();
        let mut path_start = None;
        let mut query_start = None;

        for (i, &b) in bytes.iter().enumerate() {
            state = match state {
                UrlState::Start => match b {
                    b'a'..=b'z' | b'A'..=b'Z' => UrlState::Scheme,
                    b'0'..=b'9' => {
                        builder.digit(b)?;
                        UrlState::AddressDigit
                    }
                    _ => return Err(Error::BadChar),
                },
                UrlState::Scheme => match b {
                    b'a'..=b'z' | b'A'..=b'Z' => UrlState::Scheme,
                    b':' => {
                        scheme = Some(Scheme::parse(&input[..i])?);
                        UrlState::SchemeSlash
                    }
                    _ => return Err(Error::BadChar),
                },
                UrlState::SchemeSlash => match b {
                    b'/' => UrlState::SchemeSlashSlash,
                    _ => return Err(Error::BadChar),
                },
                UrlState::SchemeSlashSlash => match b {
                    b'/' => UrlState::AddressStart,
                    _ => return Err(Error::BadChar),
                },
                UrlState::AddressStart => match b {
                    b'0'..=b'9' => {
                        builder.digit(b)?;
                        UrlState::AddressDigit
                    }
                    _ => return Err(Error::BadChar),
                },
                UrlState::AddressDigit => match b {
                    b'0'..=b'9' => {
                        builder.digit(b)?;
                        UrlState::AddressDigit
                    }
                    b'.' => {
                        builder.dot()?;
                        UrlState::AddressStart
                    }
                    b':' => {
                        ip = Some(builder.finish()?);
                        UrlState::PortStart
                    }
                    b'/' => {
                        ip = Some(builder.finish()?);
                        path_start = Some(i);
                        UrlState::Path
                    }
                    b'?' => {
                        ip = Some(builder.finish()?);
                        query_start = Some(i + 1);
                        UrlState::Query
                    }
                    _ => return Err(Error::BadChar),
                },
                UrlState::PortStart => match b {
                    b'0'..=b'9' => {
                        port.digit(b)?;
                        UrlState::PortDigit
                    }
                    _ => return Err(Error::BadChar),
                },
                UrlState::PortDigit => match b {
                    b'0'..=b'9' => {
                        port.digit(b)?;
                        UrlState::PortDigit
                    }
                    b'/' => {
                        path_start = Some(i);
                        UrlState::Path
                    }
                    b'?' => {
                        query_start = Some(i + 1);
                        UrlState::Query
                    }
                    _ => return Err(Error::BadChar),
                },
                UrlState::Path => match b {
                    b'?' => {
                        query_start = Some(i + 1);
                        UrlState::Query
                    }
                    b if is_path_byte(b) => UrlState::Path,
                    _ => return Err(Error::BadChar),
                },
                UrlState::Query => match b {
                    b if is_query_byte(b) => UrlState::Query,
                    _ => return Err(Error::BadChar),
                },
            };
        }

        match state {
            UrlState::Start
            | UrlState::Scheme
            | UrlState::SchemeSlash
            | UrlState::SchemeSlashSlash
            | UrlState::AddressStart
            | UrlState::PortStart => return Err(Error::BadFormat),
            UrlState::AddressDigit => ip = Some(builder.finish()?),
            UrlState::PortDigit | UrlState::Path | UrlState::Query => {}
        }

        let ip = ip.ok_or(Error::BadFormat)?;
        let scheme = scheme.unwrap_or(config.default_scheme);
        let port = if port.digits > 0 {
            port.finish()
        } else {
            config.default_port(scheme)
        };
        let path_end = query_start.map_or(bytes.len(), |q| q - 1);
        let path = match path_start {
            Some(start) => input[start..path_end].to_string(),
            None => "/".to_string(),
        };
        let query = match query_start {
            Some(start) if start < bytes.len() => Some(input[start..].to_string()),
            _ => None,
        };

        Ok(Self {
            scheme,
            address: ChannelAddress::new(ip, port),
            path,
            query,
        })
    }

    /// スキーム
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// 接続先アドレス
    pub fn address(&self) -> ChannelAddress {
        self.address
    }

    /// IPv4 アドレス
    pub fn ip(&self) -> [u8; 4] {
        self.address.ip
    }

    /// ポート番号
    pub fn port(&self) -> u16 {
        self.address.port
    }

    /// パス
    pub fn path(&self) -> &str {
        &self.path
    }

    /// クエリ (`?` は含まない)
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// 分解して取り出す
    pub fn into_parts(self) -> (Scheme, ChannelAddress, String, Option<String>) {
        (self.scheme, self.address, self.path, self.query)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.address, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}

/// パスをパース
///
/// `/` で始まる必要がある。`?` 以降を含めることはできない。
pub fn parse_path(input: &str) -> Result<String, Error> {
    let bytes = input.as_bytes();
    match bytes.first() {
        None => return Err(Error::BadFormat),
        Some(b'/') => {}
        Some(_) => return Err(Error::BadChar),
    }
    if !bytes.iter().all(|&b| is_path_byte(b)) {
        return Err(Error::BadChar);
    }
    Ok(input.to_string())
}

/// クエリをパース
///
/// 先頭の `?` は含めない。空文字列はクエリなし。
pub fn parse_query(input: &str) -> Result<Option<String>, Error> {
    if input.is_empty() {
        return Ok(None);
    }
    if !input.bytes().all(is_query_byte) {
        return Err(Error::BadChar);
    }
    Ok(Some(input.to_string()))
}
