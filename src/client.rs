//! Typed HTTP client for the expense tracker API.
//!
//! Login state lives in an explicit [`Session`] that callers pass to every
//! privileged call. An expired session is rejected before any request is sent.

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ErrorResponse;
use crate::models::{
    analytics::{CategoryBreakdown, MonthlySummary, SpendingTrends, YearlySummary},
    common::MessageResponse,
    payment::{
        CreateRecurringPaymentRequest, Installment, InstallmentReminder, PaymentSchedule,
        RecurringPayment, UpdateRecurringPaymentRequest,
    },
    subscription::{
        CreateSubscriptionRequest, RenewalReminder, Subscription, UpdateSubscriptionRequest,
    },
    user::{AuthResponse, LoginRequest, RegisterRequest},
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Session expired at {0}, log in again")]
    SessionExpired(DateTime<Utc>),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            user_id: auth.id,
            email: auth.email,
            token: auth.token,
            expires_at: auth.expires_at,
        }
    }
}

#[derive(Clone)]
pub struct FinanceClient {
    client: Client,
    base_url: String,
}

impl FinanceClient {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, session: &Session, method: Method, path: &str) -> Result<RequestBuilder> {
        if session.is_expired() {
            return Err(ClientError::SessionExpired(session.expires_at));
        }
        Ok(self.client.request(method, self.url(path)).bearer_auth(&session.token))
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await?;
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        log::debug!("Request failed with {}: {}", status, message);

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        Self::read(request.send().await?).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        request: RequestBuilder,
        body: &B,
    ) -> Result<T> {
        Self::read(request.json(body).send().await?).await
    }

    // Authentication
    pub async fn register(&self, email: &str, password: &str) -> Result<Session> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse =
            Self::send_json(self.client.post(self.url("/auth/register")), &body).await?;
        Ok(auth.into())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse =
            Self::send_json(self.client.post(self.url("/auth/login")), &body).await?;
        Ok(auth.into())
    }

    // Analytics
    pub async fn monthly_summary(
        &self,
        session: &Session,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<MonthlySummary> {
        let request = self
            .authorized(session, Method::GET, "/analytics/monthly-summary")?
            .query(&[
                ("month", month.map(|m| m.to_string())),
                ("year", year.map(|y| y.to_string())),
            ]);
        Self::send(request).await
    }

    pub async fn yearly_summary(
        &self,
        session: &Session,
        year: Option<i32>,
    ) -> Result<YearlySummary> {
        let request = self
            .authorized(session, Method::GET, "/analytics/yearly-summary")?
            .query(&[("year", year.map(|y| y.to_string()))]);
        Self::send(request).await
    }

    pub async fn spending_trends(&self, session: &Session) -> Result<SpendingTrends> {
        Self::send(self.authorized(session, Method::GET, "/analytics/spending-trends")?).await
    }

    pub async fn category_breakdown(&self, session: &Session) -> Result<CategoryBreakdown> {
        Self::send(self.authorized(session, Method::GET, "/analytics/category-breakdown")?).await
    }

    // Subscriptions
    pub async fn list_subscriptions(&self, session: &Session) -> Result<Vec<Subscription>> {
        Self::send(self.authorized(session, Method::GET, "/subscriptions")?).await
    }

    pub async fn create_subscription(
        &self,
        session: &Session,
        request: &CreateSubscriptionRequest,
    ) -> Result<Subscription> {
        Self::send_json(self.authorized(session, Method::POST, "/subscriptions")?, request).await
    }

    pub async fn update_subscription(
        &self,
        session: &Session,
        id: Uuid,
        request: &UpdateSubscriptionRequest,
    ) -> Result<Subscription> {
        let path = format!("/subscriptions/{}", id);
        Self::send_json(self.authorized(session, Method::PUT, &path)?, request).await
    }

    pub async fn delete_subscription(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<MessageResponse> {
        let path = format!("/subscriptions/{}", id);
        Self::send(self.authorized(session, Method::DELETE, &path)?).await
    }

    pub async fn subscription_breakdown(
        &self,
        session: &Session,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<Subscription>> {
        let request = self
            .authorized(session, Method::GET, "/subscriptions/breakdown")?
            .query(&[
                ("year", year.map(|y| y.to_string())),
                ("month", month.map(|m| m.to_string())),
            ]);
        Self::send(request).await
    }

    pub async fn renewal_reminders(&self, session: &Session) -> Result<Vec<RenewalReminder>> {
        Self::send(self.authorized(session, Method::GET, "/subscriptions/reminders")?).await
    }

    // Recurring payments
    pub async fn list_recurring_payments(
        &self,
        session: &Session,
    ) -> Result<Vec<RecurringPayment>> {
        Self::send(self.authorized(session, Method::GET, "/payments")?).await
    }

    pub async fn create_recurring_payment(
        &self,
        session: &Session,
        request: &CreateRecurringPaymentRequest,
    ) -> Result<RecurringPayment> {
        Self::send_json(self.authorized(session, Method::POST, "/payments")?, request).await
    }

    pub async fn update_recurring_payment(
        &self,
        session: &Session,
        id: Uuid,
        request: &UpdateRecurringPaymentRequest,
    ) -> Result<RecurringPayment> {
        let path = format!("/payments/{}", id);
        Self::send_json(self.authorized(session, Method::PUT, &path)?, request).await
    }

    pub async fn delete_recurring_payment(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<MessageResponse> {
        let path = format!("/payments/{}", id);
        Self::send(self.authorized(session, Method::DELETE, &path)?).await
    }

    pub async fn payment_schedule(&self, session: &Session, id: Uuid) -> Result<PaymentSchedule> {
        let path = format!("/payments/{}/schedule", id);
        Self::send(self.authorized(session, Method::GET, &path)?).await
    }

    pub async fn mark_installment_paid(
        &self,
        session: &Session,
        payment_id: Uuid,
        installment_id: Uuid,
    ) -> Result<Installment> {
        let path = format!("/payments/{}/installments/{}/pay", payment_id, installment_id);
        Self::send(self.authorized(session, Method::POST, &path)?).await
    }

    pub async fn installment_reminders(
        &self,
        session: &Session,
    ) -> Result<Vec<InstallmentReminder>> {
        Self::send(self.authorized(session, Method::GET, "/payments/reminders")?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            token: "token".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_session_expiry() {
        assert!(session(Utc::now() - Duration::seconds(1)).is_expired());
        assert!(!session(Utc::now() + Duration::hours(1)).is_expired());
    }

    #[tokio::test]
    async fn test_expired_session_fails_before_sending() {
        // Nothing listens on port 9; an attempted request would surface as ClientError::Http.
        let client = FinanceClient::new("http://127.0.0.1:9/");
        let expired = session(Utc::now() - Duration::minutes(5));

        let err = client.list_subscriptions(&expired).await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired(_)));

        let err = client.monthly_summary(&expired, Some(3), Some(2025)).await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired(_)));
    }

    #[test]
    fn test_url_building() {
        let client = FinanceClient::new("http://localhost:5000/");
        assert_eq!(
            client.url("/payments/reminders"),
            "http://localhost:5000/api/payments/reminders"
        );
    }
}
