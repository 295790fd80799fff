//! Supervised fire-and-forget tasks
//!
//! Background loads are never awaited by the code that starts them. Their
//! outcome is logged here so no failure goes unnoticed; the join handles are
//! kept only so tests and diagnostics can wait for the queue to drain.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// Registry of spawned background tasks
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    handles: Arc<Mutex<Vec<(String, JoinHandle<()>)>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task`, logging its failure instead of propagating it
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, E>(&self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let label = label.into();
        let task_label = label.clone();

        let handle = tokio::spawn(async move {
            match task.await {
                Ok(()) => tracing::debug!(task = %task_label, "Background task finished"),
                Err(e) => tracing::warn!(task = %task_label, error = %e, "Background task failed"),
            }
        });

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|(_, h)| !h.is_finished());
        handles.push((label, handle));
    }

    /// Tasks that have not finished yet
    pub fn pending(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .count()
    }

    /// Wait until every task spawned so far has finished
    ///
    /// Panicked tasks are logged. Tasks spawned while waiting are awaited too.
    pub async fn wait_idle(&self) {
        loop {
            let drained: Vec<_> = {
                let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *handles)
            };
            if drained.is_empty() {
                return;
            }
            for (label, handle) in drained {
                if let Err(e) = handle.await {
                    tracing::error!(task = %label, error = %e, "Background task panicked");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_idle_runs_all_tasks() {
        let tasks = BackgroundTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for i in 0..3 {
            let counter = Arc::clone(&counter);
            tasks.spawn(format!("task-{i}"), async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            });
        }

        tasks.wait_idle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(tasks.pending(), 0);
    }

    #[tokio::test]
    async fn test_failures_are_absorbed() {
        let tasks = BackgroundTasks::new();
        tasks.spawn("failing", async { Err::<(), _>("boom") });
        tasks.wait_idle().await;
        assert_eq!(tasks.pending(), 0);
    }
}
