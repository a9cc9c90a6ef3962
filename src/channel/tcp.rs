use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use super::{Channel, ChannelAddress, ChannelOption};
use crate::error::Error;

/// TCP ソケットのチャネル
#[derive(Debug, Default)]
pub struct TcpChannel {
    stream: Option<TcpStream>,
    connect_timeout: Option<Duration>,
    io_timeout: Option<Duration>,
}

impl TcpChannel {
    /// 新しいチャネルを作成 (接続は `open` で行う)
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続タイムアウトを指定 (ビルダーパターン)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// 接続中のストリーム
    pub fn stream(&self) -> Option<&TcpStream> {
        self.stream.as_ref()
    }

    fn apply_timeout(&self) -> Result<(), Error> {
        if let Some(stream) = &self.stream {
            stream
                .set_read_timeout(self.io_timeout)
                .and_then(|()| stream.set_write_timeout(self.io_timeout))
                .map_err(|e| {
                    tracing::debug!(error = %e, "failed to set socket timeout");
                    Error::BadOption
                })?;
        }
        Ok(())
    }
}

impl Channel for TcpChannel {
    fn open(&mut self, address: &ChannelAddress) -> Result<(), Error> {
        let addr = address.to_socket_addr();
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|e| {
            tracing::debug!(%address, error = %e, "tcp connect failed");
            Error::ChannelOpen
        })?;
        self.stream = Some(stream);
        self.apply_timeout()
    }

    fn close(&mut self) -> Result<(), Error> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // 相手が先に閉じている場合
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
                Err(e) => {
                    tracing::debug!(error = %e, "tcp read failed");
                    return Err(Error::ChannelRead);
                }
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        let stream = self.stream.as_mut().ok_or(Error::ChannelWrite)?;
        stream.write_all(data).map_err(|e| {
            tracing::debug!(error = %e, "tcp write failed");
            Error::ChannelWrite
        })?;
        Ok(data.len())
    }

    fn set_option(&mut self, option: ChannelOption) -> Result<(), Error> {
        match option {
            ChannelOption::SyncReadWrite(true) => Ok(()),
            // ノンブロッキングの読み書きには対応しない
            ChannelOption::SyncReadWrite(false) => Err(Error::BadOption),
            ChannelOption::ReadWriteTimeout(timeout) => {
                if timeout == Some(Duration::ZERO) {
                    return Err(Error::BadOption);
                }
                self.io_timeout = timeout;
                self.apply_timeout()
            }
        }
    }
}
