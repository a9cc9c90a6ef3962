//! チャネル (バイトストリームのトランスポート)
//!
//! ## 概要
//!
//! クライアントはソケットを直接所有せず、呼び出し側が用意した [`Channel`] を通して
//! 読み書きします。TLS やテスト用のトランスポートも同じトレイトで差し替えられます。
//!
//! 同梱の実装:
//!
//! - [`TcpChannel`]: 標準ライブラリの TCP ソケット
//! - [`FileChannel`]: 保存済みのレスポンスファイルを再生する
//! - [`MemoryChannel`]: メモリ上のレスポンスを返す (テスト用)
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::{Channel, ChannelAddress, MemoryChannel};
//!
//! let mut channel = MemoryChannel::new();
//! channel.push_response(b"HTTP/1.1 200 OK\r\n\r\n".to_vec());
//!
//! channel.open(&ChannelAddress::new([127, 0, 0, 1], 80)).unwrap();
//! let mut buf = [0u8; 64];
//! let n = channel.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"HTTP/1.1 200 OK\r\n\r\n");
//! ```

use core::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use crate::error::Error;

mod file;
mod memory;
mod tcp;

pub use file::FileChannel;
pub use memory::MemoryChannel;
pub use tcp::TcpChannel;

/// 接続先 (IPv4 アドレスとポート)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelAddress {
    /// IPv4 アドレス
    pub ip: [u8; 4],
    /// ポート番号
    pub port: u16,
}

impl ChannelAddress {
    /// 接続先を作成
    pub const fn new(ip: [u8; 4], port: u16) -> Self {
        Self { ip, port }
    }

    /// 標準ライブラリのソケットアドレスに変換
    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(self.ip), self.port))
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.ip;
        write!(f, "{}.{}.{}.{}:{}", a, b, c, d, self.port)
    }
}

/// チャネルオプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOption {
    /// 読み書きを同期 (ブロッキング) で行うかどうか
    SyncReadWrite(bool),
    /// 読み書きのタイムアウト (`None` で無制限)
    ReadWriteTimeout(Option<Duration>),
}

/// バイトストリームのトランスポート
///
/// すべての操作はブロッキングで行う。
pub trait Channel {
    /// 接続を開く
    fn open(&mut self, address: &ChannelAddress) -> Result<(), Error>;

    /// 接続を閉じる
    fn close(&mut self) -> Result<(), Error>;

    /// データを読み込む
    ///
    /// `Ok(0)` はストリームの終端を表す。
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// データを書き込む
    ///
    /// 渡されたバイトをすべて書き込み、そのバイト数を返す必要がある。
    fn write(&mut self, data: &[u8]) -> Result<usize, Error>;

    /// オプションを設定 (デフォルトでは無視する)
    fn set_option(&mut self, option: ChannelOption) -> Result<(), Error> {
        let _ = option;
        Ok(())
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn open(&mut self, address: &ChannelAddress) -> Result<(), Error> {
        (**self).open(address)
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        (**self).write(data)
    }

    fn set_option(&mut self, option: ChannelOption) -> Result<(), Error> {
        (**self).set_option(option)
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn open(&mut self, address: &ChannelAddress) -> Result<(), Error> {
        (**self).open(address)
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        (**self).write(data)
    }

    fn set_option(&mut self, option: ChannelOption) -> Result<(), Error> {
        (**self).set_option(option)
    }
}
