//! Bind, listen, accept, enqueue; own the worker pool; coordinate
//! shutdown.

use crate::{
    config::ServerConfig,
    errors::ConfigError,
    server::worker::{Incoming, WorkerPool},
};
use crossbeam::channel::{self, Sender};
use socket2::{Domain, Socket, Type};
use std::{
    io,
    net::{SocketAddr, TcpListener},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

/// How long the accept loop waits on `accept()` before re-checking the
/// shutdown flag, mirroring the worker pool's own poll discipline.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// Bounded drain window given to in-flight requests during shutdown.
/// Workers still running past this are abandoned, not killed.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

/// A bound, listening server: the queue and worker pool are already
/// running by the time [`Server::bind`] returns, so [`Server::run`] only
/// has to accept connections and hand them off.
pub struct Server {
    listener: TcpListener,
    sender: Sender<Incoming>,
    workers: WorkerPool,
}

impl Server {
    /// Creates the bounded queue, spawns the worker pool, and binds a
    /// listening socket with address reuse enabled, in that order, so a
    /// slow bind never leaves orphaned worker threads.
    pub fn bind(config: Arc<ServerConfig>) -> Result<Server, ConfigError> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid bind address"))?;

        let listener = bind_listener(addr, config.queue_capacity())?;

        let (sender, receiver) = channel::bounded(config.queue_capacity());
        let workers = WorkerPool::spawn(config.num_workers, receiver, Arc::clone(&config));

        Ok(Server {
            listener,
            sender,
            workers,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections and pushes them onto the bounded queue until
    /// `shutdown` is set. A full queue blocks the accept loop; that is
    /// the intended admission control.
    ///
    /// On shutdown, stops accepting, drops the sender so workers observe
    /// a disconnected channel once the queue drains, and waits up to
    /// [`SHUTDOWN_DRAIN_TIMEOUT`] for the pool to finish.
    pub fn run(self, shutdown: Arc<AtomicBool>) {
        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.sender.send((stream, peer)).is_err() {
                        break;
                    }
                }
                Err(err) if is_accept_timeout(err.kind()) => continue,
                Err(err) => {
                    log::warn!("accept failed: {err}");
                    continue;
                }
            }
        }

        drop(self.sender);
        self.workers.stop(SHUTDOWN_DRAIN_TIMEOUT);
    }
}

fn is_accept_timeout(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Builds a `SO_REUSEADDR` listening socket via `socket2` and hands it
/// back as a plain `std::net::TcpListener`. The read timeout set here is
/// what lets [`Server::run`] poll for shutdown instead of blocking in
/// `accept()` forever.
fn bind_listener(addr: SocketAddr, backlog: usize) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_read_timeout(Some(ACCEPT_POLL))?;
    socket.bind(&addr.into())?;
    socket.listen(backlog as i32)?;
    Ok(socket.into())
}
