//! Server configuration: command-line surface and the validated,
//! immutable value derived from it.
//!
//! # Configuration model
//!
//! ```text
//! [ CLI flags ] --parse--> [ Cli ] --validate--> [ ServerConfig ] --Arc--> [ workers ]
//! ```
//!
//! `ServerConfig` is built exactly once, at startup. There is no runtime
//! reconfiguration and no config file: CLI flags and their defaults are the
//! entire configuration surface.

use crate::errors::ConfigError;
use clap::Parser;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Concurrent HTTP/1.0 static-file server.
#[derive(Debug, Parser)]
#[command(name = "static_httpd", version, about, long_about = None)]
pub struct Cli {
    /// Address to bind the listening socket to.
    #[arg(short = 'a', long = "address", default_value = "127.0.0.1")]
    pub address: String,

    /// TCP port to listen on.
    #[arg(short = 'p', long = "port", default_value_t = 8080)]
    pub port: u16,

    /// Number of worker threads pulling connections off the queue.
    #[arg(short = 'w', long = "num-workers", default_value_t = 20)]
    pub num_workers: usize,

    /// Per-worker backlog multiplier; queue capacity is `num_workers * backlog`.
    #[arg(short = 'b', long = "backlog", default_value_t = 10)]
    pub backlog: usize,

    /// Directory that served files must live beneath.
    #[arg(short = 'd', long = "document-root", default_value = "./DOCUMENT_ROOT")]
    pub document_root: PathBuf,

    /// Increase log verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Validated, read-only server configuration shared across every worker.
///
/// Constructed once from [`Cli`] plus compiled-in defaults for the knobs the
/// CLI does not expose (timeouts, buffer sizes, index page name). Never
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub num_workers: usize,
    pub backlog: usize,
    /// Absolute, normalized path to an existing directory.
    pub document_root: PathBuf,
    /// How long a worker waits for more request bytes before giving up on
    /// a connection.
    pub client_socket_timeout: Duration,
    /// Hard ceiling on accumulated request bytes before `400 Bad Request`.
    pub request_max_size: usize,
    /// Chunk size used for each individual read while accumulating a request.
    pub request_chunk_size: usize,
    /// File served when a target resolves to a directory.
    pub index_page_name: &'static str,
}

impl ServerConfig {
    /// Queue capacity: `num_workers * backlog`, matching the OS listen backlog.
    pub fn queue_capacity(&self) -> usize {
        self.num_workers * self.backlog
    }

    /// Builds and validates a [`ServerConfig`] from parsed CLI flags.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document root does not exist, is
    /// not a directory, or if `num_workers`/`backlog` is zero. These are
    /// startup failures: the process exits before the listener is created.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.num_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if cli.backlog == 0 {
            return Err(ConfigError::ZeroBacklog);
        }

        let document_root = normalize_document_root(&cli.document_root)?;

        Ok(ServerConfig {
            host: cli.address,
            port: cli.port,
            num_workers: cli.num_workers,
            backlog: cli.backlog,
            document_root,
            client_socket_timeout: Duration::from_secs(30),
            request_max_size: 64 * 1024,
            request_chunk_size: 4 * 1024,
            index_page_name: "index.html",
        })
    }
}

fn normalize_document_root(raw: &Path) -> Result<PathBuf, ConfigError> {
    if !raw.exists() {
        return Err(ConfigError::DocumentRootMissing(raw.to_path_buf()));
    }
    if !raw.is_dir() {
        return Err(ConfigError::DocumentRootNotADirectory(raw.to_path_buf()));
    }
    // `canonicalize` resolves `.`/`..` and symlinks so the jail check in
    // `path::resolve` can compare against a single, stable prefix.
    raw.canonicalize()
        .map_err(|_| ConfigError::DocumentRootNotADirectory(raw.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(document_root: PathBuf) -> Cli {
        Cli {
            address: "127.0.0.1".into(),
            port: 8080,
            num_workers: 4,
            backlog: 8,
            document_root,
            verbose: 0,
        }
    }

    #[test]
    fn rejects_zero_workers_and_zero_backlog() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = cli(dir.path().to_path_buf());
        c.num_workers = 0;
        assert!(matches!(
            ServerConfig::from_cli(c),
            Err(ConfigError::ZeroWorkers)
        ));

        let mut c = cli(dir.path().to_path_buf());
        c.backlog = 0;
        assert!(matches!(
            ServerConfig::from_cli(c),
            Err(ConfigError::ZeroBacklog)
        ));
    }

    #[test]
    fn rejects_missing_or_non_directory_roots() {
        let missing = PathBuf::from("/does/not/exist/at/all");
        assert!(matches!(
            ServerConfig::from_cli(cli(missing)),
            Err(ConfigError::DocumentRootMissing(_))
        ));

        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ServerConfig::from_cli(cli(file.path().to_path_buf())),
            Err(ConfigError::DocumentRootNotADirectory(_))
        ));
    }

    #[test]
    fn queue_capacity_multiplies_workers_by_backlog() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ServerConfig::from_cli(cli(dir.path().to_path_buf())).unwrap();
        assert_eq!(cfg.queue_capacity(), 4 * 8);
    }
}
