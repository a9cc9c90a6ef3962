use crate::channel::ChannelAddress;
use crate::error::Error;
use crate::request::{Method, Scheme};
use crate::version::Version;

/// 送信チャンクバッファの最小サイズ
pub const MIN_SEND_CHUNK_LEN: usize = 16;

/// クライアントとリクエストのデフォルト設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// スキーム省略時のスキーム (デフォルト: http)
    pub default_scheme: Scheme,
    /// デフォルトメソッド (デフォルト: GET)
    pub default_method: Method,
    /// デフォルト HTTP バージョン (デフォルト: HTTP/1.1)
    pub default_version: Version,
    /// デフォルトの接続先 (デフォルト: 127.0.0.1:80)
    pub default_address: ChannelAddress,
    /// http のデフォルトポート (デフォルト: 80)
    pub http_port: u16,
    /// https のデフォルトポート (デフォルト: 443)
    pub https_port: u16,
    /// 送信チャンクバッファのサイズ (デフォルト: 512 バイト)
    ///
    /// リクエスト全体がこのサイズを超える場合はチャンクに分けて送信する。
    pub send_chunk_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_scheme: Scheme::Http,
            default_method: Method::Get,
            default_version: Version::Http11,
            default_address: ChannelAddress::new([127, 0, 0, 1], 80),
            http_port: 80,
            https_port: 443,
            send_chunk_len: 512,
        }
    }
}

impl Config {
    /// スキームに対応するデフォルトポート
    pub fn default_port(&self, scheme: Scheme) -> u16 {
        match scheme {
            Scheme::Http => self.http_port,
            Scheme::Https => self.https_port,
        }
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), Error> {
        if self.send_chunk_len < MIN_SEND_CHUNK_LEN {
            return Err(Error::BadOption);
        }
        if self.default_version == Version::Unknown {
            return Err(Error::BadOption);
        }
        Ok(())
    }
}
