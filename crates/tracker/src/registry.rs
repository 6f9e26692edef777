//! In-memory registry of outstanding provider jobs.
//!
//! [`TaskRegistry`] holds only pending work. A job leaves the registry
//! through [`TaskRegistry::resolve`], which is the single arbiter of which
//! completion path gets to act on it.

use std::collections::HashMap;

use saints_core::task::{NewTask, Task};
use saints_core::types::JobId;
use tokio::sync::RwLock;

/// Outstanding tasks indexed by provider job id.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between the webhook handler and the polling timers.
pub struct TaskRegistry {
    tasks: RwLock<HashMap<JobId, Task>>,
}

impl TaskRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a pending task, overwriting any entry with the same job id.
    pub async fn register(&self, new: NewTask) {
        let task = Task::from_new(new);
        let job_id = task.job_id.clone();
        let client_task_id = task.client_task_id.clone();

        let replaced = self.tasks.write().await.insert(job_id.clone(), task);

        if replaced.is_some() {
            tracing::debug!(job_id = %job_id, client_task_id = %client_task_id, "Task re-registered, metadata overwritten");
        } else {
            tracing::debug!(job_id = %job_id, client_task_id = %client_task_id, "Task registered");
        }
    }

    /// Non-destructive read of a pending task.
    pub async fn lookup(&self, job_id: &str) -> Option<Task> {
        self.tasks.read().await.get(job_id).cloned()
    }

    /// Atomically look up and remove a task.
    ///
    /// For a given job id at most one caller ever receives `Some`; every
    /// later or concurrent caller gets `None`.
    pub async fn resolve(&self, job_id: &str) -> Option<Task> {
        self.tasks.write().await.remove(job_id)
    }

    /// Number of outstanding tasks.
    pub async fn count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use saints_core::task::TaskState;

    use super::*;

    fn new_task(job_id: &str, client_task_id: &str, title: &str) -> NewTask {
        NewTask {
            job_id: job_id.into(),
            client_task_id: client_task_id.into(),
            title: title.into(),
            genre: "Gospel".into(),
            credential: "key".into(),
            variant: 1,
        }
    }

    #[tokio::test]
    async fn new_registry_is_empty() {
        let registry = TaskRegistry::new();
        assert_eq!(registry.count().await, 0);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn register_then_lookup() {
        let registry = TaskRegistry::new();
        registry.register(new_task("J1", "abc", "Hymn")).await;

        let task = registry.lookup("J1").await.expect("task should be present");
        assert_eq!(task.client_task_id, "abc");
        assert_eq!(task.state, TaskState::Pending);

        // Lookup does not remove.
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn reregistration_overwrites_instead_of_duplicating() {
        let registry = TaskRegistry::new();
        registry.register(new_task("J1", "abc", "First")).await;
        registry.register(new_task("J1", "def", "Second")).await;

        assert_eq!(registry.count().await, 1);
        let task = registry.lookup("J1").await.unwrap();
        assert_eq!(task.title, "Second");
        assert_eq!(task.client_task_id, "def");
    }

    #[tokio::test]
    async fn resolve_removes_and_second_resolve_is_none() {
        let registry = TaskRegistry::new();
        registry.register(new_task("J1", "abc", "Hymn")).await;

        assert!(registry.resolve("J1").await.is_some());
        assert!(registry.resolve("J1").await.is_none());
        assert!(registry.lookup("J1").await.is_none());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn resolve_unknown_is_none() {
        let registry = TaskRegistry::new();
        assert!(registry.resolve("missing").await.is_none());
    }

    #[tokio::test]
    async fn shared_client_task_id_keeps_independent_entries() {
        let registry = TaskRegistry::new();
        registry.register(new_task("C1", "abc", "Hymn (Version 1)")).await;
        registry.register(new_task("C2", "abc", "Hymn (Version 2)")).await;

        assert_eq!(registry.count().await, 2);
        assert!(registry.resolve("C1").await.is_some());
        assert!(registry.lookup("C2").await.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolve_yields_exactly_one_winner() {
        let registry = Arc::new(TaskRegistry::new());

        for round in 0..200 {
            let job_id = format!("J{round}");
            registry.register(new_task(&job_id, "abc", "Hymn")).await;

            let (a, b) = {
                let r1 = Arc::clone(&registry);
                let r2 = Arc::clone(&registry);
                let id1 = job_id.clone();
                let id2 = job_id.clone();
                let h1 = tokio::spawn(async move { r1.resolve(&id1).await });
                let h2 = tokio::spawn(async move { r2.resolve(&id2).await });
                (h1.await.unwrap(), h2.await.unwrap())
            };

            assert!(
                a.is_some() ^ b.is_some(),
                "exactly one resolver must win for {job_id}"
            );
        }

        assert_eq!(registry.count().await, 0);
    }
}
