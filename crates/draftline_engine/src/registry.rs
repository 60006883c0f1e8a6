use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use draftline_core::DisplayResult;
use draftline_logging::{draft_debug, draft_info, draft_warn};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::fetch::{GenerationRequest, Transport};
use crate::pacer::{DisplaySink, Pacer, PacerControl, StreamOptions};
use crate::{StreamError, TaskId, TaskStatus};

/// Point-in-time view of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub label: &'static str,
    pub status: TaskStatus,
    pub result: DisplayResult,
}

struct TaskEntry {
    label: &'static str,
    status: TaskStatus,
    control: PacerControl,
    result_tx: watch::Sender<DisplayResult>,
}

struct RegistryInner {
    handle: Handle,
    transport: Arc<dyn Transport>,
    pacer: Pacer,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<TaskId, TaskEntry>>,
}

/// Process-lifetime table of running generations.
///
/// Each task owns its pipeline; observers only get snapshots and `watch`
/// updates. Entries stay until stopped, so a long-lived process should stop
/// tasks it no longer needs.
#[derive(Clone)]
pub struct TaskRegistry {
    inner: Arc<RegistryInner>,
}

impl TaskRegistry {
    pub fn new(handle: Handle, transport: Arc<dyn Transport>, pacer: Pacer) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                handle,
                transport,
                pacer,
                next_id: AtomicU64::new(1),
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Registers a task and starts its pipeline on the runtime.
    pub fn create(&self, request: GenerationRequest) -> TaskId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let label = request.label();
        let control = PacerControl::new();
        let (result_tx, _) = watch::channel(DisplayResult::new((self.inner.pacer.clock())()));
        self.inner.lock_tasks().insert(
            id,
            TaskEntry {
                label,
                status: TaskStatus::Running,
                control: control.clone(),
                result_tx,
            },
        );
        draft_info!("task {} created ({})", id, label);

        let inner = self.inner.clone();
        self.inner.handle.spawn(async move {
            run_task(inner, id, request, control).await;
        });
        id
    }

    pub fn get(&self, id: TaskId) -> Option<TaskSnapshot> {
        let tasks = self.inner.lock_tasks();
        tasks.get(&id).map(|entry| TaskSnapshot {
            id,
            label: entry.label,
            status: entry.status,
            result: entry.result_tx.borrow().clone(),
        })
    }

    /// Receives every stored result of the task. The channel closes when the
    /// task is stopped.
    pub fn subscribe(&self, id: TaskId) -> Option<watch::Receiver<DisplayResult>> {
        self.inner
            .lock_tasks()
            .get(&id)
            .map(|entry| entry.result_tx.subscribe())
    }

    /// Stores a new result. Rejected for unknown tasks and once the stored
    /// result is complete.
    pub fn update_result(&self, id: TaskId, result: DisplayResult) -> bool {
        self.inner.update_result(id, result)
    }

    /// Holds the display side of the task; the network read continues.
    pub fn pause(&self, id: TaskId) -> bool {
        self.inner.transition(id, TaskStatus::Running, TaskStatus::Paused, |control| {
            control.pause()
        })
    }

    pub fn resume(&self, id: TaskId) -> bool {
        self.inner.transition(id, TaskStatus::Paused, TaskStatus::Running, |control| {
            control.resume()
        })
    }

    /// Cancels the task and forgets it.
    pub fn stop(&self, id: TaskId) -> bool {
        let removed = self.inner.lock_tasks().remove(&id);
        match removed {
            Some(entry) => {
                entry.control.stop();
                draft_info!("task {} stopped", id);
                true
            }
            None => false,
        }
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.inner.lock_tasks().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl RegistryInner {
    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<TaskId, TaskEntry>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_result(&self, id: TaskId, result: DisplayResult) -> bool {
        self.store(id, |stored| *stored = result)
    }

    /// Writes into the stored result unless it is already complete.
    fn store(&self, id: TaskId, write: impl FnOnce(&mut DisplayResult)) -> bool {
        let tasks = self.lock_tasks();
        let Some(entry) = tasks.get(&id) else {
            return false;
        };
        if entry.result_tx.borrow().is_complete {
            draft_debug!("task {} already complete, update ignored", id);
            return false;
        }
        entry.result_tx.send_modify(write);
        true
    }

    fn finish(&self, id: TaskId, result: &DisplayResult) {
        self.store(id, |stored| stored.clone_from(result));
        if let Some(entry) = self.lock_tasks().get_mut(&id) {
            entry.status = if result.is_error {
                TaskStatus::Failed
            } else {
                TaskStatus::Completed
            };
        }
    }

    fn transition(
        &self,
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        apply: impl FnOnce(&PacerControl),
    ) -> bool {
        let mut tasks = self.lock_tasks();
        match tasks.get_mut(&id) {
            Some(entry) if entry.status == from => {
                entry.status = to;
                apply(&entry.control);
                true
            }
            _ => false,
        }
    }
}

/// Forwards pacer output into the registry entry of one task.
struct RegistrySink {
    inner: Arc<RegistryInner>,
    id: TaskId,
}

impl DisplaySink for RegistrySink {
    fn on_update(&self, result: &DisplayResult) {
        self.inner.store(self.id, |stored| stored.clone_from(result));
    }

    fn on_complete(&self, result: &DisplayResult) {
        self.inner.finish(self.id, result);
    }

    fn on_error(&self, error: &StreamError) {
        draft_warn!("task {} failed: {}", self.id, error);
    }
}

async fn run_task(
    inner: Arc<RegistryInner>,
    id: TaskId,
    request: GenerationRequest,
    control: PacerControl,
) {
    let sink = RegistrySink {
        inner: inner.clone(),
        id,
    };
    let options = StreamOptions {
        accumulate_mode: request.accumulate_mode(),
        ..StreamOptions::default()
    };
    match inner
        .transport
        .open(&request, control.cancellation_token())
        .await
    {
        Ok(opened) => {
            inner.pacer.run(opened, options, &sink, &control).await;
        }
        Err(error) => {
            inner.pacer.fail_unopened(error, &sink);
        }
    }
}
