//! Notification emails via the Resend API.
//!
//! All sends are fire-and-forget: failures are logged, never propagated,
//! and never block or fail the triggering operation.

use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{ExtensionClaim, WithdrawalRequest, WithdrawalStatus};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailSendResult {
    Sent,
    /// No API key configured; the message was logged only.
    Disabled,
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone)]
pub struct EmailSender {
    client: Client,
    api_key: Option<String>,
    from: String,
}

impl EmailSender {
    pub fn new(api_key: Option<String>, from: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            from,
        }
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<EmailSendResult> {
        let Some(key) = &self.api_key else {
            tracing::info!(to, subject, "email disabled; skipping send");
            return Ok(EmailSendResult::Disabled);
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(key)
            .json(&ResendRequest {
                from: &self.from,
                to,
                subject,
                html,
            })
            .send()
            .await
            .map_err(|e| AppError::External(format!("Resend API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!("Resend API error: {}", error_text)));
        }

        Ok(EmailSendResult::Sent)
    }

    /// Spawn a send without waiting for it. Failures are logged at warn.
    fn send_detached(&self, to: String, subject: String, html: String) {
        let sender = self.clone();
        tokio::spawn(async move {
            if let Err(e) = sender.send(&to, &subject, &html).await {
                tracing::warn!(to, subject, error = %e, "notification email failed");
            }
        });
    }

    pub fn notify_extension_received(&self, claim: &ExtensionClaim) {
        let subject = format!("We received your device extension request {}", claim.claim_number);
        let html = if claim.requires_review {
            format!(
                "<p>Your request <strong>{}</strong> is in the review queue. \
                 Our team will get back to you shortly.</p>",
                claim.claim_number
            )
        } else {
            format!(
                "<p>Your request <strong>{}</strong> was received and will be \
                 processed automatically within a few minutes.</p>",
                claim.claim_number
            )
        };
        self.send_detached(claim.email.clone(), subject, html);
    }

    pub fn notify_extension_decided(&self, claim: &ExtensionClaim, approved: bool) {
        let subject = format!("Update on your extension request {}", claim.claim_number);
        let html = if approved {
            format!(
                "<p>Request <strong>{}</strong> was approved. Your license now \
                 allows one more device.</p>",
                claim.claim_number
            )
        } else {
            format!(
                "<p>Request <strong>{}</strong> was not approved. Reply to this \
                 email if you believe this is a mistake.</p>",
                claim.claim_number
            )
        };
        self.send_detached(claim.email.clone(), subject, html);
    }

    pub fn notify_withdrawal_requested(&self, partner_email: &str, request: &WithdrawalRequest) {
        let subject = "Your withdrawal request was received".to_string();
        let html = format!(
            "<p>We received your withdrawal request for <strong>${:.2}</strong>. \
             After fees of ${:.2}, <strong>${:.2}</strong> will be deposited once \
             the request is approved.</p>",
            request.amount_requested, request.total_fees, request.amount_to_deposit
        );
        self.send_detached(partner_email.to_string(), subject, html);
    }

    pub fn notify_withdrawal_decided(&self, partner_email: &str, request: &WithdrawalRequest) {
        let (subject, html) = match request.status {
            WithdrawalStatus::Paid => (
                "Your withdrawal has been paid".to_string(),
                format!(
                    "<p><strong>${:.2}</strong> is on its way to your account.</p>",
                    request.amount_to_deposit
                ),
            ),
            WithdrawalStatus::Failed => (
                "Your withdrawal could not be completed".to_string(),
                "<p>The transfer failed. Our team has been notified and will \
                 follow up with you.</p>"
                    .to_string(),
            ),
            WithdrawalStatus::Rejected => (
                "Your withdrawal request was declined".to_string(),
                "<p>Reply to this email if you have questions about this decision.</p>".to_string(),
            ),
            _ => return,
        };
        self.send_detached(partner_email.to_string(), subject, html);
    }
}
