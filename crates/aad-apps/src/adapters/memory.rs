//! # In-Memory Node
//!
//! Implements `ProgramCompiler` and `ApplicationReader` without a node, for
//! tests and offline dry runs. "Compiling" returns the source bytes
//! unchanged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use aad_types::Application;
use parking_lot::RwLock;
use tracing::debug;

use crate::errors::ServiceError;
use crate::ports::outbound::{ApplicationReader, ProgramCompiler};

/// Node stand-in holding deployed applications in memory.
#[derive(Debug, Default)]
pub struct InMemoryNode {
    /// Deployed applications by id.
    applications: RwLock<HashMap<u64, Application>>,
    /// Sources passed to `compile`.
    compiles: AtomicUsize,
    /// When set, every call fails with `Unavailable`.
    offline: AtomicBool,
}

impl InMemoryNode {
    /// Create an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploys `app`, replacing any application with the same id.
    pub fn insert_application(&self, app: Application) {
        debug!(app_id = app.id, "inserted application");
        self.applications.write().insert(app.id, app);
    }

    /// Makes every following call fail, or succeed again.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful `compile` calls.
    #[must_use]
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), ServiceError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("in-memory node is offline".into()));
        }
        Ok(())
    }
}

impl ProgramCompiler for InMemoryNode {
    fn compile(&self, source: &str) -> Result<Vec<u8>, ServiceError> {
        self.check_online()?;
        if source.trim().is_empty() {
            return Err(ServiceError::Compile("empty program".into()));
        }
        self.compiles.fetch_add(1, Ordering::SeqCst);
        Ok(source.as_bytes().to_vec())
    }
}

impl ApplicationReader for InMemoryNode {
    fn get_application(&self, app_id: u64) -> Result<Application, ServiceError> {
        self.check_online()?;
        self.applications
            .read()
            .get(&app_id)
            .cloned()
            .ok_or(ServiceError::ApplicationNotFound(app_id))
    }
}
