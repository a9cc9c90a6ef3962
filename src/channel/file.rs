use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use super::{Channel, ChannelAddress};
use crate::error::Error;

/// 保存済みのレスポンスファイルを再生するチャネル
///
/// `open` のたびにファイルを先頭から読み直す。書き込まれたリクエストは記録される。
#[derive(Debug)]
pub struct FileChannel {
    path: PathBuf,
    file: Option<File>,
    written: Vec<u8>,
}

impl FileChannel {
    /// ファイルを指定してチャネルを作成
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
            written: Vec::new(),
        }
    }

    /// 書き込まれたバイト列
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Channel for FileChannel {
    fn open(&mut self, address: &ChannelAddress) -> Result<(), Error> {
        let file = File::open(&self.path).map_err(|e| {
            tracing::debug!(%address, path = %self.path.display(), error = %e, "file open failed");
            Error::ChannelOpen
        })?;
        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.file = None;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let file = self.file.as_mut().ok_or(Error::ChannelRead)?;
        loop {
            match file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "file read failed");
                    return Err(Error::ChannelRead);
                }
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        if self.file.is_none() {
            return Err(Error::ChannelWrite);
        }
        self.written.extend_from_slice(data);
        Ok(data.len())
    }
}
