//! RequestWriter のプロパティテスト

use echo_http::{
    Channel, ChannelAddress, Error, MIN_SEND_CHUNK_LEN, Method, Request, RequestWriter,
    encode_request,
};
use pbt::{body, unique_headers, url_path};
use proptest::prelude::*;

/// 書き込みごとのバイト列を記録するチャネル
#[derive(Default)]
struct RecordingChannel {
    writes: Vec<Vec<u8>>,
}

impl Channel for RecordingChannel {
    fn open(&mut self, _address: &ChannelAddress) -> Result<(), Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Error> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.writes.push(data.to_vec());
        Ok(data.len())
    }
}

fn method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::Get),
        Just(Method::Post),
        Just(Method::Head),
        Just(Method::Put),
    ]
}

fn request() -> impl Strategy<Value = Request> {
    (method(), url_path(), unique_headers(8), body()).prop_map(|(method, path, headers, body)| {
        let mut request = Request::new().with_method(method).with_body(body);
        request.set_path(&path).unwrap();
        for (key, value) in &headers {
            request.headers_mut().add(key, value).unwrap();
        }
        request
    })
}

proptest! {
    #[test]
    fn output_does_not_depend_on_capacity(
        request in request(),
        capacity in MIN_SEND_CHUNK_LEN..1024
    ) {
        let mut channel = RecordingChannel::default();
        let mut writer = RequestWriter::new(capacity).unwrap();
        writer.write_request(&mut channel, &request).unwrap();
        prop_assert_eq!(writer.buffered(), 0);
        prop_assert_eq!(channel.writes.concat(), encode_request(&request));
    }

    #[test]
    fn buffered_writes_never_exceed_capacity(
        request in request(),
        capacity in MIN_SEND_CHUNK_LEN..256
    ) {
        let mut channel = RecordingChannel::default();
        let mut writer = RequestWriter::new(capacity).unwrap();
        writer.write_request(&mut channel, &request).unwrap();

        for data in &channel.writes {
            prop_assert!(!data.is_empty());
            // 容量を超えるのは直接書き出した断片だけ
            if data.len() > capacity {
                let direct = data.as_slice() == request.body()
                    || data.as_slice() == request.path().as_bytes()
                    || request
                        .headers()
                        .into_iter()
                        .flatten()
                        .any(|e| {
                            data.as_slice() == e.key().as_bytes()
                                || data.as_slice() == e.value().as_bytes()
                        });
                prop_assert!(direct);
            }
        }
    }

    #[test]
    fn small_pieces_are_coalesced(pieces in proptest::collection::vec("[a-z]{1,8}", 1..64)) {
        let mut channel = RecordingChannel::default();
        let mut writer = RequestWriter::new(MIN_SEND_CHUNK_LEN).unwrap();
        for piece in &pieces {
            writer.write(&mut channel, piece.as_bytes()).unwrap();
        }
        writer.flush(&mut channel).unwrap();

        let total: usize = pieces.iter().map(String::len).sum();
        prop_assert_eq!(channel.writes.concat(), pieces.concat().into_bytes());
        prop_assert!(channel.writes.iter().all(|w| w.len() <= MIN_SEND_CHUNK_LEN));
        // 断片は 8 バイト以下なので、最後以外の書き出しは 9 バイト以上
        prop_assert!(channel.writes.len() <= total.div_ceil(MIN_SEND_CHUNK_LEN - 8 + 1));
    }
}
