#![no_main]

use arbitrary::Arbitrary;
use echo_http::HeaderTable;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Add(String, String),
    AddLine(String),
    Remove(String),
    Canonicalize,
    Lowercase,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut table = HeaderTable::new();
    for op in &ops {
        match op {
            Op::Add(key, value) => {
                if table.add(key, value).is_ok() {
                    assert_eq!(table.get(key), Some(value.as_str()));
                }
            }
            Op::AddLine(line) => {
                let _ = table.add_line(line);
            }
            Op::Remove(key) => {
                let _ = table.remove(key);
                assert!(!table.contains(key));
            }
            Op::Canonicalize => table.canonicalize_keys(),
            Op::Lowercase => table.lowercase_keys(),
        }
    }

    // キーは重複しない
    for (i, a) in table.iter().enumerate() {
        for b in table.iter().skip(i + 1) {
            assert!(!a.key().eq_ignore_ascii_case(b.key()));
        }
    }
});
