//! Resolves a raw request target to a file beneath the document root.
//!
//! This is the security-relevant piece of the server: every served path
//! must have the document root as a prefix after normalization (the
//! "jail"), and `..` segments are resolved lexically rather than handed to
//! the OS, so a request can never walk the filesystem above the root.

use crate::errors::ErrorKind;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Resolves `raw_target` (the request-URI as received, query string and
/// all) against `document_root`, returning the path of the file to serve.
pub(crate) fn resolve(
    document_root: &Path,
    raw_target: &str,
    index_page_name: &str,
) -> Result<PathBuf, ErrorKind> {
    let path_part = raw_target.split('?').next().unwrap_or("");

    if has_invalid_percent_escape(path_part) {
        return Err(ErrorKind::NotFound);
    }

    let decoded = percent_decode_str(path_part)
        .decode_utf8()
        .map_err(|_| ErrorKind::NotFound)?;

    let relative = if decoded.is_empty() || decoded.as_ref() == "/" {
        index_page_name
    } else {
        decoded.trim_start_matches('/')
    };

    let segments = normalize_segments(relative).ok_or(ErrorKind::NotFound)?;

    let mut candidate = document_root.to_path_buf();
    for segment in &segments {
        candidate.push(segment);
    }

    // Redundant with the stack discipline in `normalize_segments`, but
    // kept explicit since the jail invariant is the one thing this
    // function must never get wrong.
    if !candidate.starts_with(document_root) {
        return Err(ErrorKind::NotFound);
    }

    if candidate.is_dir() {
        let index = candidate.join(index_page_name);
        if index.is_file() {
            Ok(index)
        } else {
            Err(ErrorKind::NotFound)
        }
    } else if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(ErrorKind::NotFound)
    }
}

/// Resolves `.`/`..`/empty segments lexically. Returns `None` if a `..`
/// would escape above the document root (more pops than prior pushes).
fn normalize_segments(relative: &str) -> Option<Vec<&str>> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return None;
                }
            }
            other => stack.push(other),
        }
    }
    Some(stack)
}

fn has_invalid_percent_escape(path: &str) -> bool {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex_ok = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !hex_ok {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    false
}
