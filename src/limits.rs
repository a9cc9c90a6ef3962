/// レスポンスパーサーの制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserLimits {
    /// 1 回の読み込みで使用する受信バッファサイズ (デフォルト: 512 バイト)
    pub recv_buf_len: usize,
    /// 理由フレーズの最大長 (デフォルト: 31 バイト)
    pub max_reason_phrase_len: usize,
    /// ヘッダーキーの最大長 (デフォルト: 127 バイト)
    pub max_header_key_len: usize,
    /// ヘッダー値の最大長 (デフォルト: 1023 バイト)
    pub max_header_value_len: usize,
    /// 最大ヘッダー数 (デフォルト: 100)
    pub max_headers_count: usize,
    /// 最大ボディサイズ (デフォルト: 10MB)
    ///
    /// ボディシンクを使わずにボディをバッファへ保存する場合のみ適用される。
    pub max_body_size: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            recv_buf_len: 512,
            max_reason_phrase_len: 31,
            max_header_key_len: 127,
            max_header_value_len: 1023,
            max_headers_count: 100,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ParserLimits {
    /// 制限なしの設定を作成
    ///
    /// 受信バッファサイズはデフォルトのまま。
    pub fn unlimited() -> Self {
        Self {
            recv_buf_len: 512,
            max_reason_phrase_len: usize::MAX,
            max_header_key_len: usize::MAX,
            max_header_value_len: usize::MAX,
            max_headers_count: usize::MAX,
            max_body_size: usize::MAX,
        }
    }
}
