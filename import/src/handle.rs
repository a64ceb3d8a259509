use std::sync::mpsc;

use fieldplot_core::mesh::MeshId;

use crate::error::{ImportError, ImportResult};

/// Completion channel of one import task.
///
/// The task sends its result exactly once. If the task panics the sender is
/// dropped and the handle reports [`ImportError::TaskLost`].
pub struct TaskHandle<T> {
    mesh_id: MeshId,
    receiver: mpsc::Receiver<T>,
}

impl<T> TaskHandle<T> {
    pub fn new(mesh_id: MeshId, receiver: mpsc::Receiver<T>) -> Self {
        Self { mesh_id, receiver }
    }

    /// Mesh the task imports.
    pub fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }

    /// Attempts to retrieve the result without blocking.
    ///
    /// Returns `Ok(None)` while the task is still running.
    pub fn try_recv(&self) -> ImportResult<Option<T>> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ImportError::TaskLost {
                mesh_id: self.mesh_id,
            }),
        }
    }

    /// Blocks until the task completes and returns its result.
    pub fn recv(self) -> ImportResult<T> {
        self.receiver.recv().map_err(|_| ImportError::TaskLost {
            mesh_id: self.mesh_id,
        })
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("mesh_id", &self.mesh_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_recv_empty() {
        let (_tx, rx) = mpsc::channel::<u32>();
        let handle = TaskHandle::new(1, rx);
        assert_eq!(handle.try_recv().unwrap(), None);
    }

    #[test]
    fn try_recv_ready() {
        let (tx, rx) = mpsc::channel();
        tx.send(42u32).unwrap();
        let handle = TaskHandle::new(1, rx);
        assert_eq!(handle.try_recv().unwrap(), Some(42));
    }

    #[test]
    fn recv_disconnected() {
        let (tx, rx) = mpsc::channel::<u32>();
        drop(tx);
        let handle = TaskHandle::new(7, rx);
        assert!(matches!(handle.recv(), Err(ImportError::TaskLost { mesh_id: 7 })));
    }
}
