/*!
 * Bounded task execution.
 *
 * `TaskRegistry` tracks the observable state of every submitted unit of work.
 * `BoundedExecutor` spawns submitted operations on the tokio runtime and admits
 * at most `max_workers` of them into their body at once.
 *
 * Every operation outcome resolves its work item: a returned error and a panic
 * both mark the item completed with `error` set, and the admission permit is
 * released on drop whatever happened inside the body.
 */

use anyhow::Result;
use futures::FutureExt;
use log::{debug, error};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Semaphore, watch};

use crate::errors::TaskError;

/// Identifier handed out on submission
pub type TaskId = u64;

/// Snapshot of one unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem<T> {
    /// Registry-assigned id
    pub id: TaskId,

    /// Value produced by the operation
    pub result: Option<T>,

    /// Why the operation produced no value
    pub error: Option<TaskError>,

    /// Whether the operation has finished
    pub completed: bool,
}

impl<T> WorkItem<T> {
    fn pending(id: TaskId) -> Self {
        Self {
            id,
            result: None,
            error: None,
            completed: false,
        }
    }

    /// Whether the item finished with a value
    pub fn succeeded(&self) -> bool {
        self.completed && self.result.is_some()
    }
}

/// Instance-scoped table of work items.
///
/// Entries are only removed through [`TaskRegistry::discard`].
pub struct TaskRegistry<T> {
    next_id: AtomicU64,
    entries: RwLock<HashMap<TaskId, watch::Sender<WorkItem<T>>>>,
}

impl<T> Default for TaskRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store a fresh pending item and return its id
    pub fn register(&self) -> TaskId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (sender, _) = watch::channel(WorkItem::pending(id));
        self.entries.write().insert(id, sender);
        id
    }

    /// Current state of an item
    pub fn lookup(&self, id: TaskId) -> Option<WorkItem<T>> {
        self.entries.read().get(&id).map(|sender| sender.borrow().clone())
    }

    /// Receiver that observes the item's completion
    pub fn subscribe(&self, id: TaskId) -> Option<watch::Receiver<WorkItem<T>>> {
        self.entries.read().get(&id).map(|sender| sender.subscribe())
    }

    /// Remove an item, returning its last state
    pub fn discard(&self, id: TaskId) -> Option<WorkItem<T>> {
        self.entries.write().remove(&id).map(|sender| sender.borrow().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Resolve an item. Only the first call for an id has any effect.
    fn complete(&self, id: TaskId, outcome: std::result::Result<T, TaskError>) {
        let entries = self.entries.read();
        let Some(sender) = entries.get(&id) else {
            debug!("Task {} finished after being discarded", id);
            return;
        };

        sender.send_if_modified(|item| {
            if item.completed {
                return false;
            }
            match outcome {
                Ok(value) => item.result = Some(value),
                Err(e) => item.error = Some(e),
            }
            item.completed = true;
            true
        });
    }
}

/// Decrements the in-flight counter when the body is left, panics included
struct InFlightGuard {
    counter: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Admission-controlled scheduler over a [`TaskRegistry`]
pub struct BoundedExecutor<T> {
    registry: Arc<TaskRegistry<T>>,
    gate: Arc<Semaphore>,
    max_workers: usize,
    in_flight: Arc<AtomicUsize>,
}

impl<T> BoundedExecutor<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an executor admitting at most `max_workers` bodies at once (minimum 1)
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        debug!("Task executor ready, max parallel tasks: {}", max_workers);
        Self {
            registry: Arc::new(TaskRegistry::new()),
            gate: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Number of operation bodies running right now
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &TaskRegistry<T> {
        &self.registry
    }

    /// Register and schedule an async operation without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F, Fut>(&self, operation: F) -> TaskId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let id = self.registry.register();
        let registry = Arc::clone(&self.registry);
        let gate = Arc::clone(&self.gate);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let outcome = {
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("Task {} could not be admitted: {}", id, e);
                        registry.complete(id, Err(TaskError::Failed(e.to_string())));
                        return;
                    }
                };
                let _guard = InFlightGuard::enter(&in_flight);
                debug!("Starting task {}", id);

                AssertUnwindSafe(async move { operation().await })
                    .catch_unwind()
                    .await
            };

            let outcome = match outcome {
                Ok(Ok(value)) => {
                    debug!("Task {} completed", id);
                    Ok(value)
                }
                Ok(Err(e)) => {
                    error!("Task {} failed: {:#}", id, e);
                    Err(TaskError::Failed(format!("{:#}", e)))
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!("Task {} panicked: {}", id, message);
                    Err(TaskError::Panicked(message))
                }
            };
            registry.complete(id, outcome);
        });

        debug!("Submitted task {}", id);
        id
    }

    /// Register a blocking operation; it occupies an admission slot while it
    /// runs on tokio's blocking pool.
    pub fn submit_blocking<F>(&self, operation: F) -> TaskId
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.submit(move || async move {
            match tokio::task::spawn_blocking(operation).await {
                Ok(result) => result,
                Err(join_error) if join_error.is_panic() => {
                    std::panic::resume_unwind(join_error.into_panic())
                }
                Err(join_error) => Err(anyhow::anyhow!("Blocking task was cancelled: {}", join_error)),
            }
        })
    }

    /// Wait until an item completes.
    ///
    /// Returns `None` for unknown ids, for items discarded while waiting, and
    /// when `timeout` elapses first. A timeout does not cancel the operation.
    pub async fn await_result(&self, id: TaskId, timeout: Option<Duration>) -> Option<WorkItem<T>> {
        let mut receiver = self.registry.subscribe(id)?;

        let wait = async move {
            receiver
                .wait_for(|item| item.completed)
                .await
                .ok()
                .map(|item| (*item).clone())
        };

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(item) => item,
                Err(_) => {
                    debug!("Timed out after {:?} waiting for task {}", limit, id);
                    None
                }
            },
            None => wait.await,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
