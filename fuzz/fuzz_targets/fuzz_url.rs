#![no_main]

use echo_http::host::parse_host;
use echo_http::url::{parse_path, parse_query};
use echo_http::{Config, Request, Url};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // UTF-8 文字列として解釈できる場合のみテスト
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(url) = Url::parse(s, &Config::default()) {
        // 表示形式は再パースできる
        let reparsed = Url::parse(&url.to_string(), &Config::default()).unwrap();
        assert_eq!(url, reparsed);
    }

    if let Ok(ip) = parse_host(s) {
        let formatted = format!("{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]);
        assert_eq!(formatted, s);
    }

    if let Ok(path) = parse_path(s) {
        assert!(path.starts_with('/'));
    }
    let _ = parse_query(s);

    // 失敗しても元の値は変わらない
    let mut request = Request::new();
    let before = request.address();
    if request.set_url(s).is_err() {
        assert_eq!(request.address(), before);
        assert_eq!(request.path(), "/");
    }
});
