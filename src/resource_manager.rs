//! Resource management

use crate::error::TrendsError;

use tokio::sync::{Semaphore, SemaphorePermit};

/// [crate::resource_manager::ResourceManager] limits the number of trend aggregations running at
/// once. Resource management is performed using a Tokio Semaphore.
#[derive(Debug)]
pub struct ResourceManager {
    /// Optional semaphore for tasks.
    tasks: Option<Semaphore>,
}

impl ResourceManager {
    /// Returns a new ResourceManager object.
    pub fn new(task_limit: Option<usize>) -> Self {
        Self {
            tasks: task_limit.map(Semaphore::new),
        }
    }

    /// Acquire a task resource.
    pub async fn task(&self) -> Result<Option<SemaphorePermit>, TrendsError> {
        optional_acquire(&self.tasks, 1).await
    }
}

/// Acquire permits on an optional Semaphore, if present.
async fn optional_acquire(
    sem: &Option<Semaphore>,
    n: u32,
) -> Result<Option<SemaphorePermit>, TrendsError> {
    if let Some(sem) = sem {
        sem.acquire_many(n)
            .await
            .map(Some)
            .map_err(|err| err.into())
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::TryAcquireError;

    #[tokio::test]
    async fn no_resource_management() {
        let rm = ResourceManager::new(None);
        assert!(rm.tasks.is_none());
        let _t = rm.task().await.unwrap();
        assert!(_t.is_none());
    }

    #[tokio::test]
    async fn task_limit() {
        let rm = ResourceManager::new(Some(1));
        assert!(rm.tasks.is_some());
        let _t = rm.task().await.unwrap();
        assert!(_t.is_some());
        // Check that there are no more resources (without blocking).
        assert_eq!(
            rm.tasks.as_ref().unwrap().try_acquire().err(),
            Some(TryAcquireError::NoPermits)
        );
        drop(_t);
        assert!(rm.tasks.as_ref().unwrap().try_acquire().is_ok());
    }
}
