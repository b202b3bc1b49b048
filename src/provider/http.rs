use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    configuration::Config,
    error::Error,
    model::{Payment, Payment_Status, Platform},
};

/// Fire-and-forget operator alerts. Delivery failures are logged only.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Platform callback on payment completion or cancellation, best-effort.
#[async_trait]
pub trait DepositWebhook: Send + Sync {
    async fn deposit_status(&self, platform: &Platform, payment: &Payment);
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStatusPayload {
    pub payment_id: i32,
    pub external_id: i64,
    pub status: Payment_Status,
    pub transaction_id: Option<String>,
}

impl From<&Payment> for DepositStatusPayload {
    fn from(payment: &Payment) -> Self {
        DepositStatusPayload {
            payment_id: payment.id,
            external_id: payment.external_id,
            status: payment.status,
            transaction_id: payment.transaction_id.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
}

/// Outbound HTTP: Slack alerts and platform webhooks.
#[derive(Debug)]
pub struct HTTP {
    pub config: Config,
    http: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(HTTP { config, http })
    }

    pub async fn post_slack(&self, url: &str, text: &str) -> Result<(), Error> {
        let response = self
            .http
            .post(url)
            .json(&SlackPayload { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "slack returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    pub async fn post_webhook(
        http: Client,
        url: String,
        payload: DepositStatusPayload,
    ) -> Result<(), Error> {
        let response = http.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "webhook {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for HTTP {
    async fn notify(&self, message: &str) {
        info!("{}", message);

        let Some(url) = &self.config.slack_webhook_url else {
            return;
        };

        if let Err(e) = self.post_slack(url, message).await {
            warn!("Slack notification failed: {}", e);
        }
    }
}

#[async_trait]
impl DepositWebhook for HTTP {
    async fn deposit_status(&self, platform: &Platform, payment: &Payment) {
        let Some(url) = platform.webhook_url.to_owned() else {
            return;
        };

        let http = self.http.clone();
        let payload = DepositStatusPayload::from(payment);
        let payment_id = payment.id;

        tokio::spawn(async move {
            if let Err(e) = HTTP::post_webhook(http, url, payload).await {
                error!("Webhook for payment {} failed: {}", payment_id, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_deposit_status_payload() {
        let payment = Payment {
            id: 12,
            platform_id: 1,
            status: Payment_Status::Completed,
            created_at: Utc::now(),
            cancelled_at: None,
            completed_at: Some(Utc::now()),
            sender: String::from("SENDER"),
            asset_id: 388_592_191,
            amount: 500,
            transaction_id: Some(String::from("TXID")),
            external_id: 42,
        };

        let json =
            serde_json::to_value(DepositStatusPayload::from(&payment)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "paymentId": 12,
                "externalId": 42,
                "status": "completed",
                "transactionId": "TXID"
            })
        );
    }
}
