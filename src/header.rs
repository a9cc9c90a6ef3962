//! ヘッダーテーブル
//!
//! ## 概要
//!
//! キーの大文字小文字を区別しない、挿入順を保持するヘッダーテーブルを提供します。
//! キーは常に小文字で保存され、同じキーは一つしか存在しません。
//!
//! ## 使い方
//!
//! ```rust
//! use echo_http::HeaderTable;
//!
//! let mut table = HeaderTable::new();
//! table.add("Accept-Encoding", "gzip").unwrap();
//! table.add_line("Content-Type: text/plain").unwrap();
//!
//! assert_eq!(table.get("accept-encoding"), Some("gzip"));
//! assert_eq!(table.get("CONTENT-TYPE"), Some("text/plain"));
//! assert_eq!(table.len(), 2);
//! ```

use crate::error::Error;

/// 初回確保時のエントリ数
const INITIAL_CAPACITY: usize = 8;

/// キーとして許可される文字 (英数字とハイフン)
pub(crate) fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// 値として許可される文字 (スペースと可視 ASCII)
pub(crate) fn is_value_byte(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// キーのハッシュ (djb2, 小文字化して計算)
fn hash_key(key: &[u8]) -> u32 {
    key.iter().fold(5381u32, |hash, &b| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(u32::from(b.to_ascii_lowercase()))
    })
}

/// ヘッダーエントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    key: String,
    value: String,
    hash: u32,
}

impl HeaderEntry {
    /// キー (通常は小文字)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 値
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 大文字小文字を区別しないキーのハッシュ
    pub fn hash(&self) -> u32 {
        self.hash
    }

    fn matches(&self, key: &[u8], hash: u32) -> bool {
        self.hash == hash
            && self.key.len() == key.len()
            && self.key.as_bytes().eq_ignore_ascii_case(key)
    }
}

/// ヘッダーテーブル
///
/// 検索はハッシュと長さで事前に弾いてから線形走査する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    entries: Vec<HeaderEntry>,
}

impl HeaderTable {
    /// 空のテーブルを作成 (メモリは最初の追加時に確保する)
    pub fn new() -> Self {
        Self::default()
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 確保済みのエントリ数
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// エントリのスライス (挿入順)
    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    /// エントリのイテレーター (挿入順)
    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.entries.iter()
    }

    /// ヘッダーを追加
    ///
    /// 同じキー (大文字小文字を区別しない) が既にある場合は値を上書きし、位置は変えない。
    pub fn add(&mut self, key: &str, value: &str) -> Result<(), Error> {
        if key.is_empty() || !key.bytes().all(is_key_byte) {
            return Err(Error::BadHeaderKey);
        }
        if !value.bytes().all(is_value_byte) {
            return Err(Error::BadHeaderValue);
        }
        self.insert(key, value)
    }

    /// 検証済みのキーと値を挿入
    pub(crate) fn insert(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let hash = hash_key(key.as_bytes());
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.matches(key.as_bytes(), hash))
        {
            entry.value = value.to_string();
            return Ok(());
        }

        self.grow()?;
        self.entries.push(HeaderEntry {
            key: key.to_ascii_lowercase(),
            value: value.to_string(),
            hash,
        });
        Ok(())
    }

    /// 容量が足りなければ倍に拡張する
    fn grow(&mut self) -> Result<(), Error> {
        if self.entries.len() < self.entries.capacity() {
            return Ok(());
        }
        let additional = if self.entries.capacity() == 0 {
            INITIAL_CAPACITY
        } else {
            self.entries.capacity()
        };
        self.entries
            .try_reserve_exact(additional)
            .map_err(|_| Error::OutOfMemory)
    }

    /// `Key: Value` 形式の 1 行をパースして追加
    ///
    /// コロンの後ろの空白はいくつでも読み飛ばす。値の末尾はそのまま保持する。
    pub fn add_line(&mut self, line: &str) -> Result<(), Error> {
        let (key, value) = parse_line(line)?;
        self.insert(key, value)
    }

    /// ヘッダーを検索 (大文字小文字を区別しない)
    pub fn find(&self, key: &str) -> Option<&HeaderEntry> {
        let hash = hash_key(key.as_bytes());
        self.entries
            .iter()
            .find(|e| e.matches(key.as_bytes(), hash))
    }

    /// ヘッダーの値を取得 (大文字小文字を区別しない)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key).map(HeaderEntry::value)
    }

    /// ヘッダーが存在するか確認
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// ヘッダーを削除
    ///
    /// 後続のエントリは前に詰められ、相対的な順序は保たれる。
    pub fn remove(&mut self, key: &str) -> Option<HeaderEntry> {
        let hash = hash_key(key.as_bytes());
        let index = self
            .entries
            .iter()
            .position(|e| e.matches(key.as_bytes(), hash))?;
        Some(self.entries.remove(index))
    }

    /// すべてのエントリを削除し、確保したメモリも解放する
    pub fn clear(&mut self) {
        self.entries = Vec::new();
    }

    /// すべてのエントリを削除する (確保したメモリは再利用する)
    pub(crate) fn reset(&mut self) {
        self.entries.clear();
    }

    /// すべてのキーを小文字にする
    pub fn lowercase_keys(&mut self) {
        for entry in &mut self.entries {
            entry.key.make_ascii_lowercase();
        }
    }

    /// すべてのキーを送信用の表記にする
    ///
    /// 先頭と `-` の直後の文字を大文字にする (`content-length` → `Content-Length`)
    pub fn canonicalize_keys(&mut self) {
        for entry in &mut self.entries {
            let mut upper = true;
            let canonical: String = entry
                .key
                .chars()
                .map(|c| {
                    let mapped = if upper {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    };
                    upper = c == '-';
                    mapped
                })
                .collect();
            entry.key = canonical;
        }
    }
}

impl<'a> IntoIterator for &'a HeaderTable {
    type Item = &'a HeaderEntry;
    type IntoIter = std::slice::Iter<'a, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// ヘッダー行パーサーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Start,
    Key,
    Colon,
    Spaces,
    Value,
}

fn parse_line(line: &str) -> Result<(&str, &str), Error> {
    let bytes = line.as_bytes();
    let mut state = LineState::Start;
    let mut key_end = 0;
    let mut value_start = bytes.len();

    for (i, &b) in bytes.iter().enumerate() {
        match state {
            LineState::Start => {
                if b == b':' {
                    return Err(Error::BadHeaderLine);
                }
                if !is_key_byte(b) {
                    return Err(Error::BadHeaderKey);
                }
                state = LineState::Key;
            }
            LineState::Key => {
                if b == b':' {
                    key_end = i;
                    state = LineState::Colon;
                } else if !is_key_byte(b) {
                    return Err(Error::BadHeaderKey);
                }
            }
            LineState::Colon | LineState::Spaces => {
                if b == b' ' {
                    state = LineState::Spaces;
                } else if is_value_byte(b) {
                    value_start = i;
                    state = LineState::Value;
                } else {
                    return Err(Error::BadHeaderValue);
                }
            }
            LineState::Value => {
                if !is_value_byte(b) {
                    return Err(Error::BadHeaderValue);
                }
            }
        }
    }

    match state {
        LineState::Start | LineState::Key => Err(Error::BadHeaderLine),
        LineState::Colon | LineState::Spaces | LineState::Value => {
            Ok((&line[..key_end], &line[value_start..]))
        }
    }
}
