//! In-memory registry of open authoring sessions.
//!
//! Each session wraps one [`UploadFormController`] behind its own mutex.
//! Handlers hold that lock only while touching the controller, never across
//! a collaborator call, so a slow upload or store write does not block
//! reads of the same session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tunedrop_core::error::CoreError;
use tunedrop_core::form::{SessionPhase, UploadFormController};
use tunedrop_core::types::WalletAddress;
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub owner: WalletAddress,
    pub controller: UploadFormController,
    last_active: Instant,
}

impl Session {
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}

type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller owned by `owner` and return its session id.
    pub async fn open(&self, owner: WalletAddress, controller: UploadFormController) -> SessionId {
        let id = Uuid::new_v4();
        let session = Session {
            id,
            owner,
            controller,
            last_active: Instant::now(),
        };
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    /// Lock the session `id` on behalf of `wallet`.
    ///
    /// Sessions of other creators are reported as missing.
    pub async fn lock(
        &self,
        id: SessionId,
        wallet: &WalletAddress,
    ) -> Result<OwnedMutexGuard<Session>, CoreError> {
        let not_found = || CoreError::NotFound {
            entity: "session",
            id: id.to_string(),
        };
        let handle = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(not_found)?;
        let mut session = handle.lock_owned().await;
        if &session.owner != wallet {
            return Err(not_found());
        }
        session.touch();
        Ok(session)
    }

    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions idle for longer than `max_idle`. Sessions that are
    /// locked right now or have a submission running are kept. Returns the
    /// number dropped.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => {
                session.controller.phase() == SessionPhase::Submitting
                    || session.idle_for() <= max_idle
            }
            Err(_) => true,
        });
        before - sessions.len()
    }
}
