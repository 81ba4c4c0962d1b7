//! Session registry: user id → container pair.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::backend::RaceBackend;
use crate::stores::{AuthStore, RaceStore};

/// The container pair owned by one authenticated session.
pub struct UserSession {
    pub auth: Arc<AuthStore>,
    pub races: RaceStore,
}

impl UserSession {
    pub fn new(backend: Arc<dyn RaceBackend>) -> Self {
        let auth = Arc::new(AuthStore::new(backend.clone()));
        let races = RaceStore::new(backend, auth.clone());
        Self { auth, races }
    }
}

/// Live sessions, keyed by user id.
///
/// Sessions exist only in process memory. After a restart the registry is
/// empty, so a still-valid cookie answers 401 and the holder logs in again.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, Arc<UserSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: Uuid, session: Arc<UserSession>) {
        self.sessions.insert(user_id, session);
    }

    pub fn get(&self, user_id: Uuid) -> Option<Arc<UserSession>> {
        self.sessions.get(&user_id).map(|entry| entry.clone())
    }

    pub fn remove(&self, user_id: Uuid) {
        self.sessions.remove(&user_id);
    }
}
