//! Stripe Connect transfer client, used only when an admin approves a
//! withdrawal. A failed transfer marks the request FAILED and is never
//! retried automatically.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

const STRIPE_TRANSFERS_URL: &str = "https://api.stripe.com/v1/transfers";

#[derive(Debug, Deserialize)]
struct TransferResponse {
    id: String,
}

#[derive(Clone)]
pub struct StripeTransfers {
    client: Client,
    secret_key: Option<String>,
}

impl StripeTransfers {
    pub fn new(secret_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Transfer `amount_cents` to a connected account. Returns the Stripe
    /// transfer id.
    pub async fn create_transfer(
        &self,
        destination_account: &str,
        amount_cents: i64,
        currency: &str,
        description: &str,
    ) -> Result<String> {
        let Some(key) = &self.secret_key else {
            return Err(AppError::External("Stripe is not configured".into()));
        };

        let response = self
            .client
            .post(STRIPE_TRANSFERS_URL)
            .bearer_auth(key)
            .form(&[
                ("amount", amount_cents.to_string()),
                ("currency", currency.to_string()),
                ("destination", destination_account.to_string()),
                ("description", description.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::External(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!("Stripe API error: {}", error_text)));
        }

        let transfer: TransferResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Failed to parse Stripe response: {}", e)))?;

        Ok(transfer.id)
    }
}
