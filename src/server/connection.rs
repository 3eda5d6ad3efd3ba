//! Per-connection orchestrator: read, parse, dispatch, write, close.
//! Runs entirely on the worker thread that dequeued the connection and
//! never touches state shared with any other worker.

use crate::{
    config::ServerConfig,
    errors::ErrorKind,
    http::{method::Method, request::Request, response::Response},
    mime, path,
};
use std::{
    io::{ErrorKind as IoErrorKind, Read},
    net::{Shutdown, SocketAddr, TcpStream},
};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Runs the full `ReadingHeaders -> Parsing -> Dispatching -> Writing ->
/// Closing` state machine for one accepted connection. Every exit path,
/// success, parse failure, path failure, or I/O failure, closes the socket
/// before returning.
pub(crate) fn handle(mut stream: TcpStream, peer: SocketAddr, config: &ServerConfig) {
    if let Err(err) = stream.set_read_timeout(Some(config.client_socket_timeout)) {
        log::warn!("{peer}: could not set read timeout: {err}");
        let _ = stream.shutdown(Shutdown::Both);
        return;
    }

    match read_parse_and_respond(&mut stream, config) {
        Ok((method, target, status)) => {
            log::info!("{peer} \"{method} {target}\" {status}");
        }
        Err(err) if err.sends_response() => {
            let (status, _) = err.as_response();
            log::warn!("{peer}: {err} -> {status}");
        }
        Err(err) => log::debug!("{peer}: {err}"),
    }

    let _ = stream.shutdown(Shutdown::Both);
}

fn read_parse_and_respond(
    stream: &mut TcpStream,
    config: &ServerConfig,
) -> Result<(String, String, &'static str), ErrorKind> {
    let buf = read_request(stream, config).map_err(|err| write_error(stream, err, false))?;
    let request = Request::parse(&buf).map_err(|err| write_error(stream, err, false))?;
    let headers_only = request.method() == Method::Head;

    let response = match dispatch(&request, config) {
        Ok(response) => response,
        Err(err) => return Err(write_error(stream, err, headers_only)),
    };

    let status = response.status;
    response.write_to(stream)?;
    Ok((request.method.clone(), request.target.clone(), status))
}

/// Writes the canned response for `err`, if its kind sends one, with
/// `headers_only` honored so a failed `HEAD` request never gets a body.
/// Returns `err` unchanged so the caller can propagate and log it.
fn write_error(stream: &mut TcpStream, err: ErrorKind, headers_only: bool) -> ErrorKind {
    if err.sends_response() {
        let (status, body) = err.as_response();
        if let Err(write_err) = Response::plain(status, body, headers_only).write_to(stream) {
            log::debug!("failed to write error response: {write_err}");
        }
    }
    err
}

fn dispatch(request: &Request, config: &ServerConfig) -> Result<Response, ErrorKind> {
    match request.method() {
        Method::Get | Method::Head => {
            let headers_only = request.method() == Method::Head;
            let resolved = path::resolve(&config.document_root, &request.target, config.index_page_name)?;
            let content_type = mime::resolve(&resolved);
            Ok(Response::ok_file(resolved, content_type, headers_only))
        }
        Method::Other => Err(ErrorKind::MethodNotAllowed),
    }
}

/// Accumulates bytes in `request_chunk_size` reads until a full header
/// block is seen, the size cap is hit, the peer hangs up, or the read
/// times out.
fn read_request(stream: &mut TcpStream, config: &ServerConfig) -> Result<Vec<u8>, ErrorKind> {
    let mut buf = Vec::with_capacity(config.request_chunk_size);
    let mut chunk = vec![0u8; config.request_chunk_size];

    loop {
        if contains_header_terminator(&buf) {
            return Ok(buf);
        }
        if buf.len() > config.request_max_size {
            return Err(ErrorKind::RequestTooLarge);
        }

        match stream.read(&mut chunk) {
            Ok(0) => return Err(ErrorKind::Incomplete),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(err) if is_timeout(err.kind()) => return Err(ErrorKind::Incomplete),
            Err(err) => return Err(ErrorKind::from(err)),
        }
    }
}

fn is_timeout(kind: IoErrorKind) -> bool {
    matches!(kind, IoErrorKind::WouldBlock | IoErrorKind::TimedOut)
}

fn contains_header_terminator(buf: &[u8]) -> bool {
    buf.len() >= HEADER_TERMINATOR.len()
        && buf
            .windows(HEADER_TERMINATOR.len())
            .any(|window| window == HEADER_TERMINATOR)
}
