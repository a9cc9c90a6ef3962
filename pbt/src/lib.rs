//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// アドレス生成
// ========================================

/// IPv4 アドレスのオクテット
pub fn ipv4_octets() -> impl Strategy<Value = [u8; 4]> {
    any::<[u8; 4]>()
}

/// ポート番号 (0 を含む)
pub fn port() -> impl Strategy<Value = u16> {
    any::<u16>()
}

/// `a.b.c.d` 形式の文字列
pub fn format_ipv4(octets: [u8; 4]) -> String {
    format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
}

// ========================================
// パスとクエリ生成
// ========================================

/// `/` で始まるパス
pub fn url_path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "(/[a-zA-Z0-9._~!$&'()*+,;=:@%-]{1,16}){1,4}".prop_map(|s| s),
    ]
}

/// `?` を含まないクエリ (空を除く)
pub fn url_query() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9=&_.~-]{1,32}".prop_map(|s| s)
}

// ========================================
// ヘッダー生成
// ========================================

/// ヘッダーキー (英数字とハイフン)
pub fn header_key() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9-]{0,23}".prop_map(|s| s)
}

/// ヘッダー値 (先頭の空白は受信時に読み飛ばされるので含めない)
pub fn header_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[!-~][ -~]{0,47}".prop_map(|s| s),
    ]
}

/// キーが重複しないヘッダー列 (`content-length` は含まない)
pub fn unique_headers(max: usize) -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((header_key(), header_value()), 0..max).prop_map(|headers| {
        let mut unique: Vec<(String, String)> = Vec::new();
        for (key, value) in headers {
            if key.eq_ignore_ascii_case("content-length") {
                continue;
            }
            if !unique.iter().any(|(k, _)| k.eq_ignore_ascii_case(&key)) {
                unique.push((key, value));
            }
        }
        unique
    })
}

// ========================================
// レスポンス生成
// ========================================

/// 受け付けるステータスコード
pub fn status_code() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200u16),
        Just(206u16),
        Just(400u16),
        Just(401u16),
        Just(404u16),
        Just(500u16),
    ]
}

/// 理由句 (英字、スペース、ハイフン)
pub fn reason_phrase() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("OK".to_string()),
        Just("Not Found".to_string()),
        Just("Partial Content".to_string()),
        "[A-Za-z][A-Za-z -]{0,30}".prop_map(|s| s),
    ]
}

/// ボディ
pub fn body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..512)
}

/// `Content-Length` 付きのレスポンスを組み立てる
pub fn build_response(
    status: u16,
    reason: &str,
    headers: &[(String, String)],
    body: &[u8],
) -> Vec<u8> {
    let mut data = format!("HTTP/1.1 {} {}\r\n", status, reason).into_bytes();
    for (key, value) in headers {
        data.extend_from_slice(format!("{}: {}\r\n", key, value).as_bytes());
    }
    data.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
    data.extend_from_slice(body);
    data
}
