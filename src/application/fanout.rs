//! Notification fan-out: one stored row per recipient, then detached push delivery.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::push::{PushDispatcher, PushPayload, PushReport};
use crate::application::repos::{NewNotification, NotificationsRepo, RepoError, UsersRepo};
use crate::domain::entities::NotificationRecord;
use crate::domain::notices::Notice;

const FALLBACK_ACTOR_NAME: &str = "Usuario";

/// Decides who receives a notice. Callers pick the policy.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    async fn resolve(&self) -> Result<Vec<Uuid>, RepoError>;
}

/// Every registered account.
#[derive(Clone)]
pub struct AllUsers {
    users: Arc<dyn UsersRepo>,
}

impl AllUsers {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl RecipientResolver for AllUsers {
    async fn resolve(&self) -> Result<Vec<Uuid>, RepoError> {
        self.users.list_user_ids().await
    }
}

/// A fixed list of accounts.
#[derive(Debug, Clone, Default)]
pub struct ExplicitRecipients(pub Vec<Uuid>);

#[async_trait]
impl RecipientResolver for ExplicitRecipients {
    async fn resolve(&self) -> Result<Vec<Uuid>, RepoError> {
        Ok(self.0.clone())
    }
}

/// What a fan-out wrote, plus a handle on the in-flight push delivery.
pub struct FanoutReceipt {
    pub notifications: Vec<NotificationRecord>,
    delivery: Option<JoinHandle<PushReport>>,
}

impl FanoutReceipt {
    pub fn written(&self) -> usize {
        self.notifications.len()
    }

    /// Wait for push delivery to finish. Callers that do not care simply drop the receipt.
    pub async fn delivery_report(self) -> PushReport {
        match self.delivery {
            Some(handle) => handle.await.unwrap_or_default(),
            None => PushReport::default(),
        }
    }
}

#[derive(Clone)]
pub struct NotificationFanout {
    notifications: Arc<dyn NotificationsRepo>,
    dispatcher: PushDispatcher,
}

impl NotificationFanout {
    pub fn new(notifications: Arc<dyn NotificationsRepo>, dispatcher: PushDispatcher) -> Self {
        Self {
            notifications,
            dispatcher,
        }
    }

    pub async fn publish(
        &self,
        notice: &Notice,
        actor: Option<&Principal>,
        recipients: &dyn RecipientResolver,
    ) -> Result<FanoutReceipt, RepoError> {
        let mut user_ids = recipients.resolve().await?;
        user_ids.sort_unstable();
        user_ids.dedup();

        if user_ids.is_empty() {
            return Ok(FanoutReceipt {
                notifications: Vec::new(),
                delivery: None,
            });
        }

        let action_by = actor.map(|p| p.user_id);
        let action_by_name = actor.map(|p| {
            p.display_name()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(FALLBACK_ACTOR_NAME)
                .to_string()
        });

        let rows = user_ids
            .iter()
            .map(|user_id| NewNotification {
                user_id: *user_id,
                title: notice.title.clone(),
                message: notice.message.clone(),
                action_by,
                action_by_name: action_by_name.clone(),
            })
            .collect();
        let notifications = self.notifications.insert_notifications(rows).await?;
        counter!("carpas_notifications_written_total").increment(notifications.len() as u64);

        let payload = PushPayload {
            title: notice.title.clone(),
            body: notice.message.clone(),
            url: Some(notice.url.to_string()),
            tag: Some(notice.tag.to_string()),
            notification_id: match notifications.as_slice() {
                [single] => Some(single.id),
                _ => None,
            },
        };

        let dispatcher = self.dispatcher.clone();
        let tag = notice.tag;
        let delivery = tokio::spawn(async move {
            let report = dispatcher.deliver(&user_ids, &payload).await;
            if report.is_complete() {
                info!(
                    target = "carpas::fanout",
                    tag,
                    delivered = report.delivered.len(),
                    unreachable = report.unreachable.len(),
                    pruned = report.pruned,
                    "push fan-out finished"
                );
            } else {
                warn!(
                    target = "carpas::fanout",
                    tag,
                    delivered = report.delivered.len(),
                    failed = report.failed.len(),
                    unreachable = report.unreachable.len(),
                    pruned = report.pruned,
                    failed_users = ?report.failed,
                    "push fan-out partially failed"
                );
            }
            report
        });

        Ok(FanoutReceipt {
            notifications,
            delivery: Some(delivery),
        })
    }

    /// Fan out on behalf of a mutation that has already committed. Failures are logged only.
    pub async fn publish_detached(
        &self,
        notice: &Notice,
        actor: Option<&Principal>,
        recipients: &dyn RecipientResolver,
    ) {
        if let Err(err) = self.publish(notice, actor, recipients).await {
            warn!(
                target = "carpas::fanout",
                error = %err,
                tag = notice.tag,
                "failed to store notifications"
            );
        }
    }
}
