use core::fmt;

/// HTTP バージョン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// HTTP/0.9
    Http09,
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
    /// 未知のバージョン (パース失敗)
    Unknown,
}

impl Version {
    /// メジャー / マイナー番号からバージョンを決定
    ///
    /// 完全一致しない場合は `Unknown`
    pub fn from_digits(major: u8, minor: u8) -> Self {
        match (major, minor) {
            (0, 9) => Version::Http09,
            (1, 0) => Version::Http10,
            (1, 1) => Version::Http11,
            _ => Version::Unknown,
        }
    }

    /// `HTTP/` の後ろに続く番号部分
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http09 => "0.9",
            Version::Http10 => "1.0",
            Version::Http11 => "1.1",
            Version::Unknown => "?",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}", self.as_str())
    }
}
