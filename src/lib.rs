//! static_httpd - a concurrent HTTP/1.0 static-file server
//!
//! Accepts TCP connections, parses request lines and headers, maps URL
//! paths to files beneath a configured document root, and serves `GET`
//! and `HEAD` with automatic directory-index resolution. Persistent
//! connections, chunked encoding, TLS, request bodies, byte ranges,
//! compression, auth, and virtual hosts are all out of scope.
//!
//! # Architecture
//!
//! ```text
//! [ CLI ] -> [ ServerConfig ] -> [ Server::bind ]
//!                                      |
//!                               [ bounded queue ]
//!                              /        |        \
//!                        [worker]  [worker]  [worker]  (fixed pool)
//!                              \        |        /
//!                          [ connection handler ]
//!                        read -> parse -> dispatch -> write -> close
//! ```
//!
//! One accept thread owns the listening socket and pushes accepted
//! sockets onto a bounded channel; a fixed pool of worker threads pulls
//! from that channel and runs the connection state machine sequentially
//! and synchronously. The channel is the only state shared between
//! threads, so there are no locks beyond it.
//!
//! This crate has no third-party extension points. Unlike a
//! general-purpose HTTP framework, every module here exists to serve one
//! binary. [`run`] is the entire public surface; `src/main.rs` just calls
//! it and turns the result into a process exit code.

pub mod config;
pub(crate) mod errors;
pub(crate) mod http {
    pub(crate) mod method;
    pub(crate) mod request;
    pub(crate) mod response;
}
pub(crate) mod mime;
pub(crate) mod path;
pub mod server;

pub use config::{Cli, ServerConfig};
pub use errors::ConfigError;
pub use server::server::Server;

use clap::Parser;
use std::{
    process::ExitCode,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Parses CLI flags, validates configuration, binds the listener, and
/// runs the accept loop until an external interrupt requests shutdown.
///
/// Returns a non-zero [`ExitCode`] if the document root is missing or not
/// a directory, or if the listen bind fails.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match ServerConfig::from_cli(cli) {
        Ok(config) => Arc::new(config),
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::bind(Arc::clone(&config)) {
        Ok(server) => server,
        Err(err) => {
            log::error!("failed to bind {}:{}: {err}", config.host, config.port);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_on_interrupt = Arc::clone(&shutdown);
    if let Err(err) = ctrlc::set_handler(move || {
        shutdown_on_interrupt.store(true, Ordering::SeqCst);
    }) {
        log::warn!("failed to install interrupt handler: {err}");
    }

    log::info!(
        "listening on {} with {} workers, document root {}",
        server
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| format!("{}:{}", config.host, config.port)),
        config.num_workers,
        config.document_root.display(),
    );

    server.run(shutdown);
    log::info!("shutdown complete");
    ExitCode::SUCCESS
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env).init();
}
