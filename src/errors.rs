use std::{error, fmt, io};

/// The closed set of failure conditions this server recognizes.
///
/// Every fallible stage (parsing, path resolution, response building) returns
/// `Result<_, ErrorKind>` so a single match at the top of the connection
/// handler decides the wire status and body for any failure, instead of
/// scattering status codes across the call stack.
#[derive(Debug)]
pub(crate) enum ErrorKind {
    /// Request line could not be split into method/target/version, or the
    /// method/version tokens were not recognized.
    BadRequest,
    /// Method recognized by the parser but not served by this core (`GET`/`HEAD` only).
    MethodNotAllowed,
    /// Path resolution failed: outside the document root, missing file, or
    /// a directory with no index page.
    NotFound,
    /// Accumulated request bytes exceeded `request_max_size` before a
    /// complete header block was seen.
    RequestTooLarge,
    /// The peer closed the connection, or the read timed out, before a
    /// complete request was received. No response is sent for this case.
    Incomplete,
    /// A write to the socket failed (most commonly a broken pipe) while
    /// streaming the response body.
    BrokenPipe(IoError),
    /// Any other I/O failure while reading the request or serving a file.
    Io(IoError),
}

macro_rules! http_errors {
    ($($name:ident: $status:literal => $body:literal; )*) => {
        /// Returns the status line and body this error maps to, per the
        /// fixed condition → status → body table.
        pub(crate) fn as_response(&self) -> (&'static str, &'static [u8]) {
            match self {
                $( Self::$name { .. } => ($status, $body.as_bytes()), )*
            }
        }
    };
}

impl ErrorKind {
    http_errors! {
        BadRequest: "400 Bad Request" => "Bad Request";
        MethodNotAllowed: "405 Method Not Allowed" => "Method Not Allowed";
        NotFound: "404 Not Found" => "Not Found";
        RequestTooLarge: "400 Bad Request" => "Bad Request";
        Incomplete: "400 Bad Request" => "Bad Request";
        BrokenPipe: "500 Internal Server Error" => "Internal Server Error";
        Io: "500 Internal Server Error" => "Internal Server Error";
    }

    /// Whether this error should produce a wire response at all. A
    /// connection that never completed a request line (timeout, empty
    /// read) is simply closed, and a broken pipe mid-transfer means a
    /// response was already attempted and failed.
    pub(crate) fn sends_response(&self) -> bool {
        !matches!(self, ErrorKind::Incomplete | ErrorKind::BrokenPipe(_))
    }
}

impl error::Error for ErrorKind {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::BadRequest => write!(f, "malformed request"),
            ErrorKind::MethodNotAllowed => write!(f, "method not allowed"),
            ErrorKind::NotFound => write!(f, "resource not found"),
            ErrorKind::RequestTooLarge => write!(f, "request exceeds size limit"),
            ErrorKind::Incomplete => write!(f, "connection closed before a full request arrived"),
            ErrorKind::BrokenPipe(e) => write!(f, "broken pipe: {}", e.0),
            ErrorKind::Io(e) => write!(f, "io error: {}", e.0),
        }
    }
}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe => ErrorKind::BrokenPipe(IoError(err)),
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Io(IoError(err)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct IoError(pub(crate) io::Error);

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

/// Startup-time configuration failures. Unlike [`ErrorKind`], these never
/// reach a socket; they are reported to stderr and turned into a non-zero
/// exit code before the accept loop starts.
#[derive(Debug)]
pub enum ConfigError {
    DocumentRootMissing(std::path::PathBuf),
    DocumentRootNotADirectory(std::path::PathBuf),
    ZeroWorkers,
    ZeroBacklog,
    Bind(io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DocumentRootMissing(p) => {
                write!(f, "document root {} does not exist", p.display())
            }
            ConfigError::DocumentRootNotADirectory(p) => {
                write!(f, "document root {} is not a directory", p.display())
            }
            ConfigError::ZeroWorkers => write!(f, "--num-workers must be at least 1"),
            ConfigError::ZeroBacklog => write!(f, "--backlog must be at least 1"),
            ConfigError::Bind(e) => write!(f, "failed to bind listening socket: {e}"),
        }
    }
}

impl error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Bind(err)
    }
}
