/// echo_http のエラー
///
/// すべての操作はこのフラットなエラーコードのいずれかを返す。
/// 自動リトライは行わないため、再試行する場合は呼び出し側が `Client::issue()` を再度呼ぶ。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// メモリ確保に失敗した
    #[error("out of memory")]
    OutOfMemory,

    /// 許可されていない文字
    #[error("bad character")]
    BadChar,
    /// 必須要素の途中で入力が終わった
    #[error("bad format")]
    BadFormat,
    /// http / https 以外のスキーム
    #[error("bad scheme")]
    BadScheme,
    /// 不正な IPv4 アドレス (オクテットが 255 を超える、またはオクテットが多すぎる)
    #[error("bad host")]
    BadHost,
    /// 不正なポート番号 (65535 を超える)
    #[error("bad port")]
    BadPort,

    /// 不正なヘッダーキー
    #[error("bad header key")]
    BadHeaderKey,
    /// 不正なヘッダー値
    #[error("bad header value")]
    BadHeaderValue,
    /// 不正なヘッダー行
    #[error("bad header line")]
    BadHeaderLine,
    /// ヘッダー数超過
    #[error("too many headers: {count} > {limit}")]
    TooManyHeaders { count: usize, limit: usize },

    /// 不正なステータスライン
    #[error("bad status line")]
    BadStatusLine,
    /// 未対応の HTTP バージョン
    #[error("bad HTTP version")]
    BadHttpVersion,
    /// 未対応のステータスコード
    #[error("bad status code")]
    BadStatusCode,
    /// 不正な理由フレーズ
    #[error("bad reason phrase")]
    BadReasonPhrase,
    /// ヘッダー終端の空行が不正
    #[error("bad empty line")]
    BadEmptyLine,
    /// ボディサイズ超過 (バッファ保存モードのみ)
    #[error("body too large: {size} > {limit}")]
    BodyTooLarge { size: usize, limit: usize },
    /// ボディシンクが渡されたバイト数をすべて消費しなかった
    #[error("bad body write")]
    BadBodyWrite,

    /// チャネルのオープンに失敗した
    #[error("channel open failed")]
    ChannelOpen,
    /// チャネルのクローズに失敗した
    #[error("channel close failed")]
    ChannelClose,
    /// チャネルからの読み込みに失敗した
    #[error("channel read failed")]
    ChannelRead,
    /// チャネルへの書き込みに失敗した (部分書き込みを含む)
    #[error("channel write failed")]
    ChannelWrite,
    /// レスポンス完了前にストリームが終了した
    #[error("channel reached end of stream")]
    ChannelEnd,

    /// リクエストが設定されていない
    #[error("no request configured")]
    NoRequest,
    /// 不正なオプション値
    #[error("bad option")]
    BadOption,

    /// 呼び出し側のフックが返したエラー
    #[error("hook error: {0}")]
    Hook(String),
}
