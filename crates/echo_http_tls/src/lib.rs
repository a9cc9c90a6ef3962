//! echo_http_tls - rustls channel for echo_http
//!
//! [`echo_http::Channel`] を rustls で実装した HTTPS 用のチャネルです。
//! ハンドシェイクは `open` の中で完了させます。
//!
//! ## 使い方
//!
//! ```ignore
//! use echo_http::{Client, Request};
//! use echo_http_tls::TlsChannel;
//!
//! // OS の証明書ストアで検証する
//! let channel = TlsChannel::new()?.server_name("example.com")?;
//! let mut client = Client::new(channel);
//! client.set_request(Request::from_url("https://93.184.215.14/")?);
//! let response = client.issue()?;
//! ```
//!
//! サーバー名を指定しない場合は接続先の IP アドレスで証明書を検証します。

use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use echo_http::{Channel, ChannelAddress, ChannelOption, Error};
use rustls::{ClientConfig, ClientConnection, StreamOwned};
use rustls_pki_types::{InvalidDnsNameError, ServerName};
use rustls_platform_verifier::ConfigVerifierExt;

/// rustls のチャネル
pub struct TlsChannel {
    config: Arc<ClientConfig>,
    server_name: Option<ServerName<'static>>,
    connect_timeout: Option<Duration>,
    io_timeout: Option<Duration>,
    stream: Option<StreamOwned<ClientConnection, TcpStream>>,
}

impl std::fmt::Debug for TlsChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsChannel")
            .field("server_name", &self.server_name)
            .field("connect_timeout", &self.connect_timeout)
            .field("io_timeout", &self.io_timeout)
            .field("is_open", &self.stream.is_some())
            .finish()
    }
}

impl TlsChannel {
    /// OS のプラットフォーム証明書ストアを使用するチャネルを作成
    pub fn new() -> Result<Self, rustls::Error> {
        let config = ClientConfig::with_platform_verifier()?;
        Ok(Self::with_config(Arc::new(config)))
    }

    /// TLS 設定を指定してチャネルを作成
    pub fn with_config(config: Arc<ClientConfig>) -> Self {
        Self {
            config,
            server_name: None,
            connect_timeout: None,
            io_timeout: None,
            stream: None,
        }
    }

    /// 証明書の検証と SNI に使うサーバー名 (ビルダーパターン)
    pub fn server_name(mut self, name: &str) -> Result<Self, InvalidDnsNameError> {
        self.server_name = Some(ServerName::try_from(name.to_string())?);
        Ok(self)
    }

    /// 接続タイムアウトを指定 (ビルダーパターン)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// ハンドシェイク済みのコネクション
    pub fn connection(&self) -> Option<&ClientConnection> {
        self.stream.as_ref().map(|s| &s.conn)
    }

    fn connect(&self, address: &ChannelAddress) -> Result<TcpStream, Error> {
        let addr = address.to_socket_addr();
        let sock = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|e| {
            tracing::debug!(%address, error = %e, "tcp connect failed");
            Error::ChannelOpen
        })?;
        sock.set_read_timeout(self.io_timeout)
            .and_then(|()| sock.set_write_timeout(self.io_timeout))
            .map_err(|e| {
                tracing::debug!(error = %e, "failed to set socket timeout");
                Error::ChannelOpen
            })?;
        Ok(sock)
    }
}

impl Channel for TlsChannel {
    fn open(&mut self, address: &ChannelAddress) -> Result<(), Error> {
        let server_name = self
            .server_name
            .clone()
            .unwrap_or_else(|| ServerName::IpAddress(IpAddr::from(address.ip).into()));
        let mut sock = self.connect(address)?;
        let mut conn = ClientConnection::new(Arc::clone(&self.config), server_name).map_err(|e| {
            tracing::debug!(error = %e, "failed to create tls connection");
            Error::ChannelOpen
        })?;
        while conn.is_handshaking() {
            conn.complete_io(&mut sock).map_err(|e| {
                tracing::debug!(%address, error = %e, "tls handshake failed");
                Error::ChannelOpen
            })?;
        }
        tracing::debug!(
            %address,
            version = ?conn.protocol_version(),
            "tls handshake completed"
        );
        self.stream = Some(StreamOwned::new(conn, sock));
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        stream.conn.send_close_notify();
        if let Err(e) = stream.conn.complete_io(&mut stream.sock) {
            // 相手が先に閉じていても close_notify は送れなくてよい
            tracing::debug!(error = %e, "failed to send close_notify");
        }
        match stream.sock.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => {
                tracing::debug!(error = %e, "tcp shutdown failed");
                Err(Error::ChannelClose)
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let stream = self.stream.as_mut().ok_or(Error::ChannelRead)?;
        loop {
            match stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                // close_notify なしで TCP が閉じられた
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    tracing::debug!("peer closed without close_notify");
                    return Ok(0);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "tls read failed");
                    return Err(Error::ChannelRead);
                }
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        let stream = self.stream.as_mut().ok_or(Error::ChannelWrite)?;
        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|e| {
                tracing::debug!(error = %e, "tls write failed");
                Error::ChannelWrite
            })?;
        Ok(data.len())
    }

    fn set_option(&mut self, option: ChannelOption) -> Result<(), Error> {
        match option {
            ChannelOption::SyncReadWrite(true) => Ok(()),
            ChannelOption::SyncReadWrite(false) => Err(Error::BadOption),
            ChannelOption::ReadWriteTimeout(timeout) => {
                if timeout == Some(Duration::ZERO) {
                    return Err(Error::BadOption);
                }
                self.io_timeout = timeout;
                if let Some(stream) = &self.stream {
                    stream
                        .sock
                        .set_read_timeout(timeout)
                        .and_then(|()| stream.sock.set_write_timeout(timeout))
                        .map_err(|e| {
                            tracing::debug!(error = %e, "failed to set socket timeout");
                            Error::BadOption
                        })?;
                }
                Ok(())
            }
        }
    }
}
