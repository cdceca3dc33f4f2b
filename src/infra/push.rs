//! Push gateways backed by an HTTP relay that performs the Web Push encryption.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::application::push::{PushError, PushGateway, PushPayload};
use crate::config::PushSettings;
use crate::domain::entities::PushSubscriptionRecord;
use crate::infra::error::InfraError;

#[derive(Debug, Serialize)]
struct RelayKeys<'a> {
    p256dh: &'a str,
    auth: &'a str,
}

#[derive(Debug, Serialize)]
struct RelaySubscription<'a> {
    endpoint: &'a str,
    keys: RelayKeys<'a>,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    subscription: RelaySubscription<'a>,
    payload: &'a PushPayload,
    vapid_subject: &'a str,
}

/// Forwards each delivery to the relay. The relay answers with the push service's status.
pub struct HttpRelayPushGateway {
    client: Client,
    relay_url: Url,
    public_key: Option<String>,
    subject: String,
}

impl HttpRelayPushGateway {
    pub fn new(relay_url: Url, settings: &PushSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("carpas/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::configuration(format!("push client: {err}")))?;
        Ok(Self {
            client,
            relay_url,
            public_key: settings.vapid_public_key.clone(),
            subject: settings.vapid_subject.clone(),
        })
    }
}

#[async_trait]
impl PushGateway for HttpRelayPushGateway {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        payload: &PushPayload,
    ) -> Result<(), PushError> {
        let body = RelayRequest {
            subscription: RelaySubscription {
                endpoint: &subscription.endpoint,
                keys: RelayKeys {
                    p256dh: &subscription.p256dh,
                    auth: &subscription.auth,
                },
            },
            payload,
            vapid_subject: &self.subject,
        };

        let response = self
            .client
            .post(self.relay_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| PushError::Transport(err.to_string()))?;

        let status = response.status();
        debug!(
            target = "carpas::infra::push",
            subscription_id = subscription.id,
            status = status.as_u16(),
            "relay answered"
        );
        classify_status(status)
    }

    fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }
}

fn classify_status(status: StatusCode) -> Result<(), PushError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::GONE || status == StatusCode::NOT_FOUND {
        Err(PushError::Gone)
    } else {
        Err(PushError::Rejected {
            status: status.as_u16(),
        })
    }
}

/// Used when no relay is configured. Notifications are still stored.
pub struct DisabledPushGateway;

#[async_trait]
impl PushGateway for DisabledPushGateway {
    async fn send(
        &self,
        _subscription: &PushSubscriptionRecord,
        _payload: &PushPayload,
    ) -> Result<(), PushError> {
        Err(PushError::Transport("push delivery is disabled".to_string()))
    }

    fn enabled(&self) -> bool {
        false
    }
}
