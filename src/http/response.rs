//! Status line, header, and body formatting: the wire-exact HTTP/1.0
//! response format.

use httpdate::fmt_http_date;
use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    time::SystemTime,
};

const SERVER_HEADER: &str = "static_httpd";

/// Where a response body comes from. Exactly one of these is chosen
/// before the response is sent.
pub(crate) enum BodySource {
    File(PathBuf),
    Buffer(&'static [u8]),
}

/// A response ready to be written to a socket.
pub(crate) struct Response {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: BodySource,
    /// `HEAD` builds headers identically to `GET` but never writes a body.
    pub headers_only: bool,
}

impl Response {
    pub(crate) fn ok_file(path: PathBuf, content_type: &'static str, headers_only: bool) -> Response {
        Response {
            status: "200 OK",
            content_type,
            body: BodySource::File(path),
            headers_only,
        }
    }

    /// Builds a plain-text response, used for every error path. `headers_only`
    /// must reflect the request's method so a `HEAD` request that fails still
    /// gets a body-less response with the same headers a `GET` would have had.
    pub(crate) fn plain(status: &'static str, body: &'static [u8], headers_only: bool) -> Response {
        Response {
            status,
            content_type: "text/plain",
            body: BodySource::Buffer(body),
            headers_only,
        }
    }

    fn content_length(&self) -> io::Result<u64> {
        Ok(match &self.body {
            BodySource::File(path) => path.metadata()?.len(),
            BodySource::Buffer(b) => b.len() as u64,
        })
    }

    /// Writes the status line, required headers, and (unless this is a
    /// `HEAD` response) the body to `writer`.
    ///
    /// Headers go out as a single buffered write, then the body is
    /// streamed separately.
    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let content_length = self.content_length()?;
        let date = fmt_http_date(SystemTime::now());

        let head = format!(
            "HTTP/1.0 {}\r\nServer: {}\r\nDate: {}\r\nConnection: close\r\nContent-Length: {}\r\nContent-Type: {}\r\n\r\n",
            self.status, SERVER_HEADER, date, content_length, self.content_type,
        );
        writer.write_all(head.as_bytes())?;

        if self.headers_only {
            return Ok(());
        }

        match &self.body {
            BodySource::File(path) => {
                let mut file = File::open(path)?;
                io::copy(&mut file, writer)?;
            }
            BodySource::Buffer(bytes) => writer.write_all(bytes)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(resp: &Response) -> String {
        let mut buf = Vec::new();
        resp.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_response_carries_the_required_headers() {
        let resp = Response::plain("404 Not Found", b"Not Found", false);
        let rendered = render(&resp);
        assert!(rendered.starts_with("HTTP/1.0 404 Not Found\r\n"));
        assert!(rendered.contains("Connection: close\r\n"));
        assert!(rendered.contains("Content-Length: 9\r\n"));
        assert!(rendered.contains("Content-Type: text/plain\r\n"));
        assert!(rendered.ends_with("Not Found"));
    }

    #[test]
    fn head_response_has_headers_but_no_body() {
        let resp = Response::plain("200 OK", b"this would be the body", true);
        let rendered = render(&resp);
        assert!(rendered.contains("Content-Length: 23\r\n"));
        assert!(rendered.ends_with("\r\n\r\n"));
    }

    #[test]
    fn a_head_error_response_omits_the_body_but_keeps_content_length() {
        let resp = Response::plain("404 Not Found", b"Not Found", true);
        let rendered = render(&resp);
        assert!(rendered.contains("Content-Length: 9\r\n"));
        assert!(rendered.ends_with("\r\n\r\n"));
    }

    #[test]
    fn file_response_streams_the_file_and_reports_its_size() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"<html>hi</html>").unwrap();

        let resp = Response::ok_file(file.path().to_path_buf(), "text/html", false);
        let rendered = render(&resp);
        assert!(rendered.contains("Content-Length: 15\r\n"));
        assert!(rendered.contains("Content-Type: text/html\r\n"));
        assert!(rendered.ends_with("<html>hi</html>"));
    }
}
