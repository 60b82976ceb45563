//! Current login session and session lifecycle events

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: String },
    LoggedOut,
    /// The server rejected the token
    Expired,
}

/// Shared handle to the current session; clones observe the same state
#[derive(Clone)]
pub struct SessionManager {
    current: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: Arc::new(RwLock::new(None)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn start(&self, token: String, user: User) {
        let user_id = user.id.clone();
        *self.current.write().await = Some(Session {
            token,
            user: user.without_secrets(),
        });
        tracing::info!("Session started for user {}", user_id);
        self.emit(SessionEvent::LoggedIn { user_id });
    }

    pub async fn end(&self) {
        if self.current.write().await.take().is_some() {
            tracing::info!("Session ended");
            self.emit(SessionEvent::LoggedOut);
        }
    }

    /// Drop the session after the server answered 401
    pub async fn expire(&self) {
        if self.current.write().await.take().is_some() {
            tracing::warn!("Session expired");
            self.emit(SessionEvent::Expired);
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn require_user(&self) -> AppResult<User> {
        self.current_user().await.ok_or(AppError::NotAuthenticated)
    }

    /// Replace the cached user after a profile change, keeping the token
    pub async fn refresh_user(&self, user: User) {
        if let Some(session) = self.current.write().await.as_mut() {
            if session.user.id == user.id {
                session.user = user.without_secrets();
            }
        }
    }

    pub async fn is_logged_in(&self) -> bool {
        self.current.read().await.is_some()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
