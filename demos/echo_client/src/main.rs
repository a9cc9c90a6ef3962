//! echo_http のコマンドラインクライアント
//!
//! 使い方:
//!   cargo run -p echo_client -- http://127.0.0.1:8080/
//!   cargo run -p echo_client -- -H "Accept: text/plain" -o body.bin http://127.0.0.1:8080/file
//!   cargo run -p echo_client -- --keep-alive http://127.0.0.1:8080/a /b /c?x=1
//!   cargo run -p echo_client -- --server-name example.com https://93.184.215.14/
//!
//! ホストは IPv4 アドレスのみ指定できる。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Duration;

use echo_http::{
    BodySink, Channel, ChannelOption, Client, Error, Method, Request, Response, Scheme, TcpChannel,
};
use echo_http_tls::TlsChannel;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// ボディをファイルへ書き出すシンク
struct FileSink {
    writer: BufWriter<File>,
}

impl BodySink for FileSink {
    fn write(&mut self, _offset: usize, data: &[u8]) -> Result<usize, Error> {
        let result = if data.is_empty() {
            self.writer.flush()
        } else {
            self.writer.write_all(data)
        };
        result.map_err(|e| Error::Hook(e.to_string()))?;
        Ok(data.len())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "echo_client";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let debug: bool = noargs::flag("debug")
        .doc("Enable debug logging")
        .take(&mut args)
        .is_present();

    let verbose: bool = noargs::flag("verbose")
        .short('v')
        .doc("Print request and response headers to stderr")
        .take(&mut args)
        .is_present();

    let keep_alive: bool = noargs::flag("keep-alive")
        .doc("Reuse one connection for all paths")
        .take(&mut args)
        .is_present();

    let method: Method = noargs::opt("request")
        .short('X')
        .doc("Request method: GET, POST, HEAD or PUT")
        .default("GET")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    let data: Option<String> = noargs::opt("data")
        .short('d')
        .doc("Request body")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let output: Option<String> = noargs::opt("output")
        .short('o')
        .doc("Write the response body to a file instead of stdout")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let server_name: Option<String> = noargs::opt("server-name")
        .doc("Server name for TLS certificate verification (default: the IP address)")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let timeout: u64 = noargs::opt("timeout")
        .doc("Connect and read/write timeout in seconds")
        .default("10")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // -H は複数回指定できる
    let mut headers = Vec::new();
    while let Some(header) = noargs::opt("header")
        .short('H')
        .doc("Request header (`Key: Value`), repeatable")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?
    {
        headers.push(header);
    }

    // 位置引数: URL
    let url: String = noargs::arg("<URL>")
        .doc("URL to fetch (e.g., http://127.0.0.1:8080/)")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 位置引数: 同じ接続先へ続けて送るパス
    let mut paths = Vec::new();
    while let Some(path) = noargs::arg("[PATH]...")
        .doc("Additional paths requested after the URL")
        .take(&mut args)
        .present_and_then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?
    {
        paths.push(path);
    }

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        return Ok(());
    }

    let default_filter = if debug {
        "echo_http=debug,echo_http_tls=debug,echo_client=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut request = Request::from_url(&url)?.with_method(method);
    for header in &headers {
        request.headers_mut().add_line(header)?;
    }
    if let Some(data) = data {
        request.set_body(data.into_bytes());
    }

    let timeout = Duration::from_secs(timeout);
    let channel: Box<dyn Channel + Send> = match request.scheme() {
        Scheme::Http => Box::new(TcpChannel::new().connect_timeout(timeout)),
        Scheme::Https => {
            let mut channel = TlsChannel::new()?.connect_timeout(timeout);
            if let Some(name) = &server_name {
                channel = channel.server_name(name)?;
            }
            Box::new(channel)
        }
    };

    tracing::info!(url = %url, %method, keep_alive, "start");

    let mut client = Client::new(channel);
    client.set_channel_option(ChannelOption::ReadWriteTimeout(Some(timeout)))?;
    client.set_keep_alive(keep_alive);
    if verbose {
        client.set_request_header_observer(|_total: usize, _index: usize, key: &str, value: &str| {
            eprintln!("> {}: {}", key, value);
            Ok::<(), Error>(())
        });
        client.set_response_header_observer(|_total: usize, _index: usize, key: &str, value: &str| {
            eprintln!("< {}: {}", key, value);
            Ok::<(), Error>(())
        });
    }
    if let Some(path) = &output {
        let file = File::create(path)?;
        client.set_body_sink(FileSink {
            writer: BufWriter::new(file),
        });
    }
    client.set_request(request);

    let mut stdout = std::io::stdout().lock();
    for i in 0..=paths.len() {
        if i > 0 {
            let request = client.request_mut().ok_or(Error::NoRequest)?;
            let (path, query) = paths[i - 1]
                .split_once('?')
                .unwrap_or((paths[i - 1].as_str(), ""));
            request.set_path(path)?;
            request.set_query(query)?;
        }

        let response = client.issue()?;
        print_status(response);
        if output.is_none() {
            stdout.write_all(&response.body)?;
        }
    }
    stdout.flush()?;

    client.close()?;
    Ok(())
}

fn print_status(response: &Response) {
    eprintln!(
        "HTTP/{} {} {} ({} bytes)",
        response.version, response.status, response.reason_phrase, response.content_length
    );
}
