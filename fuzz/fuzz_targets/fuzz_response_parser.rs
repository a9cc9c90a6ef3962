#![no_main]

use echo_http::{Error, Hooks, Progress, Response, ResponseParser};
use libfuzzer_sys::fuzz_target;

fn parse(parser: &mut ResponseParser, data: &[u8], chunk: usize) -> Result<Response, Error> {
    let mut response = Response::new();
    for piece in data.chunks(chunk) {
        if let Progress::Complete { consumed } = parser.feed(piece, &mut response, &mut Hooks::none())? {
            assert!(consumed <= piece.len());
            break;
        }
    }
    Ok(response)
}

fuzz_target!(|data: &[u8]| {
    // 一括で渡す
    let mut parser = ResponseParser::default();
    let whole = parse(&mut parser, data, data.len().max(1));
    let whole_complete = parser.is_complete();

    // 1 バイトずつ渡しても結果は同じ
    parser.reset();
    let bytewise = parse(&mut parser, data, 1);
    assert_eq!(whole, bytewise);
    assert_eq!(whole_complete, parser.is_complete());

    // HEAD リクエストへのレスポンスとして
    parser.reset();
    parser.set_expect_no_body(true);
    let _ = parse(&mut parser, data, 23);

    // ボディシンクあり
    parser.reset();
    let mut response = Response::new();
    let mut next_offset = 0;
    let mut sink = |offset: usize, body: &[u8]| {
        assert_eq!(offset, next_offset);
        next_offset += body.len();
        Ok::<usize, Error>(body.len())
    };
    let mut hooks = Hooks::none().with_body_sink(&mut sink);
    for piece in data.chunks(7) {
        match parser.feed(piece, &mut response, &mut hooks) {
            Ok(Progress::Partial) => {}
            Ok(Progress::Complete { .. }) | Err(_) => break,
        }
    }
    assert!(response.body.is_empty());
});
