//! パース状態の定義

/// メッセージ単位のパース状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// ステータスライン待ち
    StatusLine,
    /// ヘッダー行待ち
    HeaderLines,
    /// ヘッダー終端の空行 (CR の後の LF 待ち)
    EmptyLine,
    /// ボディをバッファへ保存中
    BodySave { remaining: usize },
    /// ボディをボディシンクへ転送中
    BodyWrite { offset: usize, remaining: usize },
    /// 完了
    Done,
}
