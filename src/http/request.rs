//! Request-line and header parsing.

use super::method::Method;
use crate::errors::ErrorKind;

/// A parsed request: method, target, version, and the raw header lines
/// between the request line and the first blank line.
///
/// Headers are kept verbatim (`name: value` strings, exactly as received)
/// rather than parsed into a map; they are opaque diagnostics the core
/// does not interpret.
#[derive(Debug)]
pub(crate) struct Request {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: Vec<String>,
}

impl Request {
    /// Parses `buf`, which must already contain a complete header block
    /// (a `\r\n\r\n` terminator); any bytes after it are ignored, since
    /// this core never reads a request body.
    ///
    /// Bytes are decoded as ISO-8859-1: every byte maps directly to the
    /// Unicode code point of the same value, so decoding can never fail
    /// and header bytes outside ASCII are preserved opaquely.
    pub(crate) fn parse(buf: &[u8]) -> Result<Request, ErrorKind> {
        let text: String = buf.iter().map(|&b| b as char).collect();
        let mut lines = text.split("\r\n");

        let request_line = lines.next().ok_or(ErrorKind::BadRequest)?;
        let mut tokens = request_line.split(' ').filter(|t| !t.is_empty());

        let method = tokens.next().ok_or(ErrorKind::BadRequest)?.to_ascii_uppercase();
        let target = tokens.next().ok_or(ErrorKind::BadRequest)?.to_string();
        let version = tokens.next().ok_or(ErrorKind::BadRequest)?.to_string();
        if tokens.next().is_some() {
            return Err(ErrorKind::BadRequest);
        }

        let mut headers = Vec::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            headers.push(line.to_string());
        }

        Ok(Request {
            method,
            target,
            version,
            headers,
        })
    }

    pub(crate) fn method(&self) -> Method {
        Method::from_token(&self.method)
    }
}
