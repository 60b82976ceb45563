//! Background polling for borrow request notifications
//!
//! Every tick the poller fetches the borrow requests relevant to the current
//! user, diffs them against the persisted notified set and hands each new
//! `(request, status)` pair to a [`NotificationSink`]. A pair is recorded per
//! user, only after the sink accepted it, so a failing sink sees it again on
//! the next poll. The set outlives logout, so a restart stays quiet.

use async_trait::async_trait;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    api::ApiClient,
    config::PollerConfig,
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowHistoryEntry, BorrowStatus},
        user::User,
    },
    permissions::{Permission, PermissionChecker},
    repository::Repository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Someone in the approver's scope asked to borrow equipment
    NewBorrowRequest,
    /// One of the current user's own requests was approved
    BorrowRequestApproved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub request_id: String,
    pub status: BorrowStatus,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl Notification {
    fn new(kind: NotificationKind, entry: &BorrowHistoryEntry) -> Self {
        let (title, body) = match kind {
            NotificationKind::NewBorrowRequest => (
                "New borrow request".to_string(),
                format!("{} wants to borrow {} x{}", entry.borrower_name, entry.item_name, entry.quantity),
            ),
            NotificationKind::BorrowRequestApproved => (
                "Borrow request approved".to_string(),
                format!("Your request for {} x{} was approved", entry.item_name, entry.quantity),
            ),
        };
        Self {
            request_id: entry.id.clone(),
            status: entry.status,
            kind,
            title,
            body,
        }
    }
}

/// Destination of user-facing notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> AppResult<()>;
}

/// Writes notifications to the log
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, notification: &Notification) -> AppResult<()> {
        tracing::info!(
            request_id = %notification.request_id,
            kind = ?notification.kind,
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}

/// Forwards notifications to an in-process receiver
pub struct ChannelSink {
    sender: mpsc::Sender<Notification>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<Notification>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn notify(&self, notification: &Notification) -> AppResult<()> {
        self.sender
            .send(notification.clone())
            .await
            .map_err(|_| AppError::Internal("Notification receiver dropped".to_string()))
    }
}

#[derive(Clone)]
pub struct NotificationPoller {
    api: ApiClient,
    repository: Repository,
    sink: Arc<dyn NotificationSink>,
    interval: Duration,
}

impl NotificationPoller {
    pub fn new(api: ApiClient, repository: Repository, sink: Arc<dyn NotificationSink>, config: &PollerConfig) -> Self {
        Self {
            api,
            repository,
            sink,
            interval: Duration::from_secs(config.interval_secs.max(1)),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one poll, returning how many notifications were delivered
    pub async fn poll_once(&self) -> AppResult<usize> {
        let Some(user) = self.api.session().current_user().await else {
            return Ok(0);
        };

        let candidates = self.candidates(&user).await?;
        if candidates.is_empty() {
            return Ok(0);
        }

        let notified = self.repository.notified.keys(&user.id).await?;
        let mut delivered = 0;
        for (kind, entry) in candidates {
            if notified.contains(&(entry.id.clone(), entry.status)) {
                continue;
            }

            let notification = Notification::new(kind, &entry);
            match self.sink.notify(&notification).await {
                Ok(()) => {
                    self.repository.notified.mark(&user.id, &entry.id, entry.status).await?;
                    delivered += 1;
                }
                Err(e) => tracing::warn!("Failed to deliver notification for {}: {}", entry.id, e),
            }
        }

        if delivered > 0 {
            tracing::debug!("Delivered {} notification(s)", delivered);
        }
        Ok(delivered)
    }

    async fn candidates(&self, user: &User) -> AppResult<Vec<(NotificationKind, BorrowHistoryEntry)>> {
        let mut candidates = Vec::new();

        if PermissionChecker::has_permission(user, Permission::ViewBorrowApproval, None) {
            let scope = PermissionChecker::department_scope(user);
            let pending = self.api.borrow_requests(BorrowStatus::Pending).await?;
            candidates.extend(
                pending
                    .into_iter()
                    .filter(|r| r.borrower_id != user.id)
                    .filter(|r| scope.map_or(true, |dept| r.department_id == dept))
                    .map(|r| (NotificationKind::NewBorrowRequest, r)),
            );
        }

        let approved = self.api.borrow_requests(BorrowStatus::Approved).await?;
        candidates.extend(
            approved
                .into_iter()
                .filter(|r| r.borrower_id == user.id)
                .map(|r| (NotificationKind::BorrowRequestApproved, r)),
        );

        Ok(candidates)
    }

    /// Poll until `shutdown` turns true or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("Notification poller started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!("Notification poll failed: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Notification poller stopped");
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::services::auth::AuthService;
    use crate::services::test_support::{client_for, logged_in, request, user};
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;

    fn router() -> Router {
        Router::new().route(
            "/borrow-requests",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let rows = match q.get("status").map(String::as_str) {
                    Some("PENDING") => vec![
                        request("p-a", "bob", "A", BorrowStatus::Pending),
                        request("p-b", "carol", "B", BorrowStatus::Pending),
                        request("p-own", "alice", "A", BorrowStatus::Pending),
                    ],
                    Some("APPROVED") => vec![
                        request("a-own", "alice", "A", BorrowStatus::Approved),
                        request("a-bob", "bob", "A", BorrowStatus::Approved),
                    ],
                    _ => vec![],
                };
                Json(rows)
            }),
        )
    }

    fn poller(api: ApiClient, repository: Repository, sink: Arc<dyn NotificationSink>) -> NotificationPoller {
        NotificationPoller::new(api, repository, sink, &PollerConfig::default())
    }

    #[tokio::test]
    async fn test_poll_is_idempotent() {
        let (api, repository) = logged_in(router(), user("alice", Role::AdvancedUser, "A")).await;

        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(|n| matches!(n.request_id.as_str(), "p-a" | "a-own"))
            .times(2)
            .returning(|_| Ok(()));
        let poller = poller(api, repository.clone(), Arc::new(sink));

        assert_eq!(poller.poll_once().await.unwrap(), 2);
        assert_eq!(poller.poll_once().await.unwrap(), 0);
        assert!(repository.notified.contains("alice", "p-a", BorrowStatus::Pending).await.unwrap());
        assert!(repository.notified.contains("alice", "a-own", BorrowStatus::Approved).await.unwrap());
    }

    #[tokio::test]
    async fn test_nothing_repeated_after_logout_and_login() {
        let (api, repository) = logged_in(router(), user("alice", Role::AdvancedUser, "A")).await;

        let mut sink = MockNotificationSink::new();
        sink.expect_notify().times(2).returning(|_| Ok(()));
        let poller = poller(api.clone(), repository.clone(), Arc::new(sink));
        assert_eq!(poller.poll_once().await.unwrap(), 2);

        AuthService::new(api.clone(), repository.clone()).logout().await.unwrap();
        assert_eq!(poller.poll_once().await.unwrap(), 0);

        api.session().start("fresh-token".into(), user("alice", Role::AdvancedUser, "A")).await;
        assert_eq!(poller.poll_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_normal_user_only_hears_about_own_approvals() {
        let (api, repository) = logged_in(router(), user("alice", Role::NormalUser, "A")).await;

        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(|n| n.kind == NotificationKind::BorrowRequestApproved && n.request_id == "a-own")
            .times(1)
            .returning(|_| Ok(()));

        assert_eq!(poller(api, repository, Arc::new(sink)).poll_once().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried() {
        let (api, repository) = logged_in(router(), user("alice", Role::NormalUser, "A")).await;

        let mut sink = MockNotificationSink::new();
        let mut seq = mockall::Sequence::new();
        sink.expect_notify()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::Internal("offline".into())));
        sink.expect_notify()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let poller = poller(api, repository, Arc::new(sink));

        assert_eq!(poller.poll_once().await.unwrap(), 0);
        assert_eq!(poller.poll_once().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_session_fetches_nothing() {
        // Any request would hit a missing route and fail
        let api = client_for(Router::new()).await;
        let sink = MockNotificationSink::new();
        let poller = poller(api, Repository::in_memory().await.unwrap(), Arc::new(sink));
        assert_eq!(poller.poll_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let (api, repository) = logged_in(router(), user("alice", Role::Admin, "A")).await;
        let (tx, mut rx) = mpsc::channel(8);
        let poller = poller(api, repository, Arc::new(ChannelSink::new(tx)))
            .with_interval(Duration::from_millis(20));

        let (stop, shutdown) = watch::channel(false);
        let handle = poller.spawn(shutdown);

        let mut ids = vec![rx.recv().await.unwrap().request_id, rx.recv().await.unwrap().request_id];
        ids.sort();
        assert_eq!(ids, vec!["a-own".to_string(), "p-a".to_string()]);

        stop.send(true).unwrap();
        handle.await.unwrap();
    }
}
