//! Background identifier generator.
//!
//! One producer thread keeps a small bounded buffer topped up with fresh
//! ids; consumers take one id per request and wait while the buffer is
//! empty. Ids are unique, not ordered.

use std::sync::{Arc, OnceLock};
use std::thread;

use orgtree_core::error::{TreeError, TreeResult};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use uuid::Uuid;

/// Number of ids kept ready.
pub const ID_BUFFER_CAPACITY: usize = 10;

static GLOBAL: OnceLock<IdGenerator> = OnceLock::new();

/// Handle to a running generator. Clones share the same buffer.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl IdGenerator {
    /// Start a producer thread filling a buffer of `capacity` ids.
    ///
    /// The producer lives until every handle is dropped. It runs on its
    /// own OS thread so it outlives any single async runtime.
    pub fn spawn(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        thread::spawn(move || produce(tx));
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// The process-wide generator, started on first use.
    pub fn global() -> Self {
        GLOBAL
            .get_or_init(|| Self::spawn(ID_BUFFER_CAPACITY))
            .clone()
    }

    /// Take the next id, waiting for the producer if the buffer is empty.
    pub async fn request_id(&self) -> TreeResult<String> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| TreeError::Backend("id generator stopped".into()))
    }
}

fn produce(tx: mpsc::Sender<String>) {
    debug!("id generator started");
    loop {
        let id = Uuid::new_v4().simple().to_string();
        if tx.blocking_send(id).is_err() {
            break;
        }
    }
    debug!("id generator stopped");
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[tokio::test]
    async fn ids_are_opaque_hex() {
        let id = IdGenerator::spawn(ID_BUFFER_CAPACITY).request_id().await.unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_never_repeat() {
        let ids = IdGenerator::spawn(ID_BUFFER_CAPACITY);
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let ids = ids.clone();
            tasks.push(tokio::spawn(async move {
                let mut mine = Vec::new();
                for _ in 0..25 {
                    mine.push(ids.request_id().await.unwrap());
                }
                mine
            }));
        }

        let mut seen = HashSet::new();
        for task in tasks {
            for id in task.await.unwrap() {
                assert!(seen.insert(id), "duplicate id handed out");
            }
        }
        assert_eq!(seen.len(), 32 * 25);
    }

    #[tokio::test]
    async fn global_generator_is_shared() {
        let a = IdGenerator::global().request_id().await.unwrap();
        let b = IdGenerator::global().request_id().await.unwrap();
        assert_ne!(a, b);
        assert!(Arc::ptr_eq(&IdGenerator::global().rx, &IdGenerator::global().rx));
    }
}
