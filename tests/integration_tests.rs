//! End-to-end coverage over real loopback sockets: accept -> parse ->
//! dispatch -> respond -> close, driven entirely through the public API.

use static_httpd::config::{Cli, ServerConfig};
use static_httpd::Server;
use std::{
    fs,
    io::{Read, Write},
    net::{SocketAddr, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

fn cli(document_root: std::path::PathBuf) -> Cli {
    Cli {
        address: "127.0.0.1".into(),
        port: 0,
        num_workers: 4,
        backlog: 4,
        document_root,
        verbose: 0,
    }
}

/// Binds a server on an OS-assigned port and runs it on a background
/// thread. Returns its address, the flag that stops it, and the join
/// handle to wait on during teardown.
fn spawn_server(document_root: std::path::PathBuf) -> (SocketAddr, Arc<AtomicBool>, JoinHandle<()>) {
    let config = Arc::new(ServerConfig::from_cli(cli(document_root)).expect("valid config"));
    let server = Server::bind(config).expect("bind succeeds");
    let addr = server.local_addr().expect("listener has a local address");

    let shutdown = Arc::new(AtomicBool::new(false));
    let handle = {
        let shutdown = Arc::clone(&shutdown);
        thread::spawn(move || server.run(shutdown))
    };

    (addr, shutdown, handle)
}

fn stop(shutdown: Arc<AtomicBool>, handle: JoinHandle<()>) {
    shutdown.store(true, Ordering::SeqCst);
    handle.join().expect("server thread does not panic");
}

/// Sends a raw HTTP/1.0 request and reads the whole response: since every
/// response closes the connection, reading to EOF is the correct way to
/// collect it.
fn roundtrip(addr: SocketAddr, raw_request: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connects to the server");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream.write_all(raw_request.as_bytes()).unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or("")
}

fn fixture_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), b"<html>home</html>").unwrap();
    fs::write(dir.path().join("img.png"), [0x89, b'P', b'N', b'G', 0, 0, 0, 0]).unwrap();
    fs::create_dir(dir.path().join("dir")).unwrap();
    fs::write(dir.path().join("dir").join("index.html"), b"<html>dir</html>").unwrap();
    dir
}

#[test]
fn get_root_returns_the_index_page() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let response = roundtrip(addr, "GET / HTTP/1.0\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.0 200 OK");
    assert!(response.contains("Content-Type: text/html"));
    assert!(response.ends_with("<html>home</html>"));

    stop(shutdown, handle);
}

#[test]
fn head_returns_headers_without_a_body() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let response = roundtrip(addr, "HEAD /img.png HTTP/1.0\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.0 200 OK");
    assert!(response.contains("Content-Type: image/png"));
    assert!(response.ends_with("\r\n\r\n"));

    stop(shutdown, handle);
}

#[test]
fn get_and_head_report_the_same_content_length_for_a_file() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let head = roundtrip(addr, "HEAD /img.png HTTP/1.0\r\n\r\n");
    let get = roundtrip(addr, "GET /img.png HTTP/1.0\r\n\r\n");

    let length = |resp: &str| {
        resp.lines()
            .find(|l| l.starts_with("Content-Length:"))
            .unwrap()
            .to_string()
    };
    assert_eq!(length(&head), length(&get));

    stop(shutdown, handle);
}

#[test]
fn directory_target_serves_its_index_page() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let response = roundtrip(addr, "GET /dir/ HTTP/1.0\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.0 200 OK");
    assert!(response.ends_with("<html>dir</html>"));

    stop(shutdown, handle);
}

#[test]
fn path_traversal_outside_the_root_is_not_found() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let response = roundtrip(addr, "GET /../../../../etc/passwd HTTP/1.0\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.0 404 Not Found");

    stop(shutdown, handle);
}

#[test]
fn missing_file_is_not_found() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let response = roundtrip(addr, "GET /nope.txt HTTP/1.0\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.0 404 Not Found");

    stop(shutdown, handle);
}

#[test]
fn post_is_method_not_allowed() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let response = roundtrip(addr, "POST / HTTP/1.0\r\nContent-Length: 0\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.0 405 Method Not Allowed");

    stop(shutdown, handle);
}

#[test]
fn malformed_request_line_is_a_bad_request() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let response = roundtrip(addr, "GET /\r\n\r\n");
    assert_eq!(status_line(&response), "HTTP/1.0 400 Bad Request");

    stop(shutdown, handle);
}

#[test]
fn repeated_requests_against_the_same_server_are_idempotent() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let first = roundtrip(addr, "GET /index.html HTTP/1.0\r\n\r\n");
    let second = roundtrip(addr, "GET /index.html HTTP/1.0\r\n\r\n");
    assert_eq!(status_line(&first), "HTTP/1.0 200 OK");
    assert_eq!(status_line(&second), "HTTP/1.0 200 OK");
    assert!(first.ends_with("<html>home</html>"));
    assert!(second.ends_with("<html>home</html>"));

    stop(shutdown, handle);
}

#[test]
fn every_response_closes_the_connection() {
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream.write_all(b"GET / HTTP/1.0\r\n\r\n").unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    assert!(!response.is_empty());

    // A second read on the same stream must observe EOF, not a hang: the
    // server already shut the socket down after writing the response.
    let mut extra = [0u8; 16];
    let n = stream.read(&mut extra).unwrap();
    assert_eq!(n, 0);

    stop(shutdown, handle);
}

#[test]
fn server_survives_a_handler_panic() {
    // There is no request shape this core can be driven to panic on from
    // the outside, so this exercises the same property indirectly: a
    // stream of mixed valid/invalid requests all get answered, proving no
    // single bad request wedges a worker.
    let dir = fixture_root();
    let (addr, shutdown, handle) = spawn_server(dir.path().to_path_buf());

    for _ in 0..20 {
        let bad = roundtrip(addr, "\r\n\r\n");
        assert_eq!(status_line(&bad), "HTTP/1.0 400 Bad Request");
        let good = roundtrip(addr, "GET / HTTP/1.0\r\n\r\n");
        assert_eq!(status_line(&good), "HTTP/1.0 200 OK");
    }

    stop(shutdown, handle);
}
