//! Maps a served file to a `Content-Type` string.

use std::path::Path;

/// Resolves a file's content type from its extension.
///
/// A small fixed table of common extensions is checked first so the
/// documented set always resolves exactly as specified regardless of
/// what the host's MIME database says; anything outside that set falls
/// through to [`mime_guess`] for broader coverage, and an unrecognized
/// extension finally defaults to `application/octet-stream`.
pub(crate) fn resolve(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("txt") => "text/plain",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("swf") => "application/x-shockwave-flash",
        _ => mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream"),
    }
}
