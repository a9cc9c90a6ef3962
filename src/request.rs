use core::fmt;
use core::str::FromStr;

use crate::channel::ChannelAddress;
use crate::config::Config;
use crate::error::Error;
use crate::header::HeaderTable;
use crate::host::parse_host;
use crate::url::{Url, parse_path, parse_query};
use crate::version::Version;

/// HTTP メソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// HEAD
    Head,
    /// PUT
    Put,
}

impl Method {
    /// メソッド名
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    /// 大文字小文字を区別せずにパース
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Method::Get, Method::Post, Method::Head, Method::Put]
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or(Error::BadOption)
    }
}

/// URL スキーム
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// http
    Http,
    /// https
    Https,
}

impl Scheme {
    /// スキーム名をパース (大文字小文字を区別しない)
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Scheme::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Scheme::Https)
        } else {
            Err(Error::BadScheme)
        }
    }

    /// スキーム名
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP リクエスト
///
/// 各要素は型付きのセッター経由でのみ変更する。
/// 未設定の要素は [`Config`] のデフォルト値になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    config: Config,
    scheme: Scheme,
    method: Method,
    version: Version,
    address: ChannelAddress,
    path: String,
    query: Option<String>,
    headers: Option<HeaderTable>,
    body: Vec<u8>,
}

impl Default for Request {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Request {
    /// デフォルト設定でリクエストを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定を指定してリクエストを作成
    pub fn with_config(config: Config) -> Self {
        let scheme = config.default_scheme;
        let mut address = config.default_address;
        address.port = config.default_port(scheme);
        Self {
            scheme,
            method: config.default_method,
            version: config.default_version,
            address,
            path: "/".to_string(),
            query: None,
            headers: None,
            body: Vec::new(),
            config,
        }
    }

    /// URL からリクエストを作成 (ビルダーパターン)
    pub fn from_url(url: &str) -> Result<Self, Error> {
        let mut request = Self::new();
        request.set_url(url)?;
        Ok(request)
    }

    /// メソッドを設定 (ビルダーパターン)
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, Error> {
        self.headers_mut().add(key, value)?;
        Ok(self)
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// URL を設定
    ///
    /// スキーム、アドレス、ポート、パス、クエリをまとめて置き換える。
    pub fn set_url(&mut self, url: &str) -> Result<(), Error> {
        let (scheme, address, path, query) = Url::parse(url, &self.config)?.into_parts();
        self.scheme = scheme;
        self.address = address;
        self.path = path;
        self.query = query;
        Ok(())
    }

    /// メソッドを設定
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// HTTP バージョンを設定
    pub fn set_version(&mut self, version: Version) -> Result<(), Error> {
        if version == Version::Unknown {
            return Err(Error::BadOption);
        }
        self.version = version;
        Ok(())
    }

    /// スキームを設定
    ///
    /// ポートは変更しない。
    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.scheme = scheme;
    }

    /// ホスト (IPv4 アドレス) を設定
    pub fn set_host(&mut self, host: &str) -> Result<(), Error> {
        self.address.ip = parse_host(host)?;
        Ok(())
    }

    /// ポートを設定
    pub fn set_port(&mut self, port: u16) {
        self.address.port = port;
    }

    /// パスを設定
    pub fn set_path(&mut self, path: &str) -> Result<(), Error> {
        self.path = parse_path(path)?;
        Ok(())
    }

    /// クエリを設定 (空文字列でクエリなし)
    pub fn set_query(&mut self, query: &str) -> Result<(), Error> {
        self.query = parse_query(query)?;
        Ok(())
    }

    /// ヘッダーテーブルを置き換え
    pub fn set_headers(&mut self, headers: HeaderTable) {
        self.headers = Some(headers);
    }

    /// ボディを設定
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// ヘッダーテーブルへの可変参照 (未作成なら作成する)
    pub fn headers_mut(&mut self) -> &mut HeaderTable {
        self.headers.get_or_insert_with(HeaderTable::new)
    }

    /// ヘッダーテーブル
    pub fn headers(&self) -> Option<&HeaderTable> {
        self.headers.as_ref()
    }

    /// 設定
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// スキーム
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// メソッド
    pub fn method(&self) -> Method {
        self.method
    }

    /// HTTP バージョン
    pub fn version(&self) -> Version {
        self.version
    }

    /// 接続先アドレス
    pub fn address(&self) -> ChannelAddress {
        self.address
    }

    /// パス
    pub fn path(&self) -> &str {
        &self.path
    }

    /// クエリ
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// ボディ
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
