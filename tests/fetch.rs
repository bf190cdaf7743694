use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use reqwest::blocking::Client;

use season_terminal::config::{ApiKey, Config};
use season_terminal::error::PipelineError;
use season_terminal::fetch::fetch_fixtures_with;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Answers exactly one request with `status` and `body`, and hands back the
/// request head it received.
fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().expect("listener address");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept request");
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        loop {
            let mut line = String::new();
            let n = reader.read_line(&mut line).expect("read request line");
            if n == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let mut stream = reader.into_inner();
        stream
            .write_all(response.as_bytes())
            .expect("write response");
        stream.flush().expect("flush response");
        head
    });
    (format!("http://{addr}"), handle)
}

fn local_client() -> Client {
    Client::builder()
        .no_proxy()
        .build()
        .expect("build test client")
}

fn config_for(base_url: String) -> Config {
    let mut cfg = Config::default();
    cfg.api_base_url = base_url;
    cfg.api_key = ApiKey::new("test-key");
    cfg
}

#[test]
fn non_200_status_carries_status_and_body() {
    let (url, server) = serve_once(
        "429 Too Many Requests",
        r#"{"message":"rate limit"}"#.to_string(),
    );
    let cfg = config_for(url);

    match fetch_fixtures_with(&local_client(), &cfg) {
        Err(PipelineError::Fetch { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, r#"{"message":"rate limit"}"#);
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
    server.join().expect("server thread");
}

#[test]
fn request_sends_key_header_and_season_query() {
    let (url, server) = serve_once("200 OK", read_fixture("fixtures_response.json"));
    let cfg = config_for(url);

    let fixtures = fetch_fixtures_with(&local_client(), &cfg).unwrap();
    assert_eq!(fixtures.len(), 4);

    let head = server.join().expect("server thread").to_ascii_lowercase();
    assert!(head.starts_with("get /fixtures?"));
    assert!(head.contains("team=126"));
    assert!(head.contains("league=71"));
    assert!(head.contains("season=2023"));
    assert!(head.contains("x-apisports-key: test-key"));
}

#[test]
fn missing_key_fails_before_any_request() {
    let mut cfg = Config::default();
    cfg.api_key = None;
    cfg.api_base_url = "http://127.0.0.1:9".to_string();
    let err = fetch_fixtures_with(&local_client(), &cfg).unwrap_err();
    assert!(matches!(err, PipelineError::MissingApiKey));
}
