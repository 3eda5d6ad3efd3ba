//! Fixed-size worker pool: each worker loops pulling `(socket, addr)`
//! pairs off the shared queue and running the connection handler.

use crate::{config::ServerConfig, server::connection};
use crossbeam::channel::{self, Receiver};
use std::{
    net::{SocketAddr, TcpStream},
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

/// How long a worker blocks on an empty queue before re-checking the
/// running flag. Short enough that `stop` is observed promptly, long
/// enough not to spin.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub(crate) type Incoming = (TcpStream, SocketAddr);

/// Owns the fixed pool of worker threads and the flag used to tell them
/// to stop accepting new work.
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Spawns `count` worker threads, each polling `receiver` for
    /// connections to handle against the shared, immutable `config`.
    pub(crate) fn spawn(count: usize, receiver: Receiver<Incoming>, config: Arc<ServerConfig>) -> WorkerPool {
        let running = Arc::new(AtomicBool::new(true));

        let handles = (0..count)
            .map(|id| {
                let receiver = receiver.clone();
                let config = Arc::clone(&config);
                let running = Arc::clone(&running);

                thread::Builder::new()
                    .name(format!("static_httpd-worker-{id}"))
                    .spawn(move || worker_loop(receiver, config, running))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        WorkerPool { handles, running }
    }

    /// Signals every worker to stop after its current connection, then
    /// waits up to `drain_timeout` for all of them to exit. Workers still
    /// running past the deadline are left running in the background
    /// rather than forcibly killed.
    pub(crate) fn stop(self, drain_timeout: Duration) {
        self.running.store(false, Ordering::SeqCst);

        let (done_tx, done_rx) = channel::bounded(1);
        let handles = self.handles;
        thread::spawn(move || {
            for handle in handles {
                let _ = handle.join();
            }
            let _ = done_tx.send(());
        });

        match done_rx.recv_timeout(drain_timeout) {
            Ok(()) => log::info!("all workers drained"),
            Err(_) => log::warn!(
                "drain timeout of {:?} exceeded; abandoning in-flight workers",
                drain_timeout
            ),
        }
    }
}

fn worker_loop(receiver: Receiver<Incoming>, config: Arc<ServerConfig>, running: Arc<AtomicBool>) {
    while running.load(Ordering::SeqCst) {
        let (stream, peer) = match receiver.recv_timeout(POLL_INTERVAL) {
            Ok(incoming) => incoming,
            Err(channel::RecvTimeoutError::Timeout) => continue,
            Err(channel::RecvTimeoutError::Disconnected) => break,
        };

        // A handler bug must never take the whole worker down, the rest
        // of the pool keeps serving connections.
        let outcome = catch_unwind(AssertUnwindSafe(|| connection::handle(stream, peer, &config)));
        if outcome.is_err() {
            log::error!("{peer}: connection handler panicked");
        }
    }
}
