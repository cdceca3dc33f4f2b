//! Browser push delivery and subscription lifecycle.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::repos::{PushSubscriptionsRepo, RepoError, UpsertSubscriptionParams};
use crate::domain::entities::PushSubscriptionRecord;

/// Body rendered by the service worker when a push arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<i64>,
}

#[derive(Debug, Error)]
pub enum PushError {
    /// The push service no longer accepts this subscription.
    #[error("subscription is gone")]
    Gone,
    #[error("push service rejected delivery with status {status}")]
    Rejected { status: u16 },
    #[error("push transport failed: {0}")]
    Transport(String),
}

/// Outbound channel to the browser push service.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        payload: &PushPayload,
    ) -> Result<(), PushError>;

    fn enabled(&self) -> bool {
        true
    }

    fn public_key(&self) -> Option<&str> {
        None
    }
}

/// Per-recipient outcome of one fan-out delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    /// At least one subscription accepted the message.
    pub delivered: Vec<Uuid>,
    /// Every subscription of the recipient failed.
    pub failed: Vec<Uuid>,
    /// The recipient has no subscription, or push is disabled.
    pub unreachable: Vec<Uuid>,
    /// Subscriptions deleted because the push service reported them gone.
    pub pruned: usize,
}

impl PushReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct PushDispatcher {
    subscriptions: Arc<dyn PushSubscriptionsRepo>,
    gateway: Arc<dyn PushGateway>,
}

impl PushDispatcher {
    pub fn new(
        subscriptions: Arc<dyn PushSubscriptionsRepo>,
        gateway: Arc<dyn PushGateway>,
    ) -> Self {
        Self {
            subscriptions,
            gateway,
        }
    }

    /// Send `payload` to every subscription of every recipient. Never fails; problems are
    /// recorded in the returned report.
    pub async fn deliver(&self, recipients: &[Uuid], payload: &PushPayload) -> PushReport {
        let mut report = PushReport::default();
        if recipients.is_empty() {
            return report;
        }
        if !self.gateway.enabled() {
            report.unreachable = recipients.to_vec();
            return report;
        }

        let subscriptions = match self.subscriptions.list_subscriptions_for(recipients).await {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                warn!(
                    target = "carpas::push",
                    error = %err,
                    recipients = recipients.len(),
                    "failed to load push subscriptions"
                );
                report.failed = recipients.to_vec();
                counter!("carpas_push_failed_total").increment(recipients.len() as u64);
                return report;
            }
        };

        let attempts = subscriptions.iter().map(|subscription| async move {
            let outcome = self.gateway.send(subscription, payload).await;
            (subscription, outcome)
        });
        let outcomes = join_all(attempts).await;

        let mut reached: HashSet<Uuid> = HashSet::new();
        let mut attempted: HashSet<Uuid> = HashSet::new();
        for (subscription, outcome) in outcomes {
            attempted.insert(subscription.user_id);
            match outcome {
                Ok(()) => {
                    reached.insert(subscription.user_id);
                    counter!("carpas_push_delivered_total").increment(1);
                }
                Err(PushError::Gone) => {
                    counter!("carpas_push_failed_total").increment(1);
                    match self
                        .subscriptions
                        .delete_subscription(&subscription.endpoint)
                        .await
                    {
                        Ok(_) => {
                            counter!("carpas_push_pruned_total").increment(1);
                            report.pruned += 1;
                        }
                        Err(err) => warn!(
                            target = "carpas::push",
                            error = %err,
                            subscription_id = subscription.id,
                            "failed to prune expired subscription"
                        ),
                    }
                    debug!(
                        target = "carpas::push",
                        user_id = %subscription.user_id,
                        subscription_id = subscription.id,
                        "subscription gone"
                    );
                }
                Err(err) => {
                    counter!("carpas_push_failed_total").increment(1);
                    warn!(
                        target = "carpas::push",
                        error = %err,
                        user_id = %subscription.user_id,
                        subscription_id = subscription.id,
                        "push delivery failed"
                    );
                }
            }
        }

        for user_id in recipients {
            if reached.contains(user_id) {
                report.delivered.push(*user_id);
            } else if attempted.contains(user_id) {
                report.failed.push(*user_id);
            } else {
                report.unreachable.push(*user_id);
            }
        }
        report
    }
}

#[derive(Debug, Error)]
pub enum PushSubscriptionError {
    #[error("El endpoint y las claves son requeridos")]
    Invalid,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct SubscribeCommand {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    /// Endpoint replaced by this one after the browser rotated keys.
    pub old_endpoint: Option<String>,
}

#[derive(Clone)]
pub struct PushSubscriptionService {
    repo: Arc<dyn PushSubscriptionsRepo>,
    gateway: Arc<dyn PushGateway>,
}

impl PushSubscriptionService {
    pub fn new(repo: Arc<dyn PushSubscriptionsRepo>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { repo, gateway }
    }

    pub async fn subscribe(
        &self,
        user_id: Uuid,
        cmd: SubscribeCommand,
    ) -> Result<PushSubscriptionRecord, PushSubscriptionError> {
        let endpoint = cmd.endpoint.trim().to_string();
        if endpoint.is_empty() || cmd.p256dh.trim().is_empty() || cmd.auth.trim().is_empty() {
            return Err(PushSubscriptionError::Invalid);
        }

        if let Some(old) = cmd.old_endpoint.as_deref().map(str::trim)
            && !old.is_empty()
            && old != endpoint
        {
            self.repo.delete_subscription(old).await?;
        }

        let record = self
            .repo
            .upsert_subscription(UpsertSubscriptionParams {
                user_id,
                endpoint,
                p256dh: cmd.p256dh.trim().to_string(),
                auth: cmd.auth.trim().to_string(),
            })
            .await?;
        Ok(record)
    }

    pub async fn unsubscribe(&self, endpoint: &str) -> Result<bool, PushSubscriptionError> {
        Ok(self.repo.delete_subscription(endpoint.trim()).await?)
    }

    pub async fn current(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PushSubscriptionRecord>, PushSubscriptionError> {
        Ok(self.repo.latest_subscription(user_id).await?)
    }

    pub async fn has_subscription(&self, user_id: Uuid) -> Result<bool, PushSubscriptionError> {
        Ok(self.current(user_id).await?.is_some())
    }

    pub fn public_key(&self) -> Option<&str> {
        self.gateway.public_key()
    }
}
