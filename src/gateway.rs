//! ACH payment gateway: transport seam, HTTP adapter and the retrying client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::Amount;
use crate::model::{PaymentReceipt, PaymentRequest, PaymentStatus};
use crate::retry::RetryPolicy;

/// Failure of a single gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid gateway url '{0}'")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("payment failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: GatewayError,
    },

    #[error("status query failed: {0}")]
    StatusQuery(#[source] GatewayError),
}

/// Outcome of a payment submission.
pub type PaymentResponse = Result<PaymentReceipt, PaymentError>;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit(&self, request: &PaymentRequest) -> Result<PaymentReceipt, GatewayError>;
    async fn status(&self, transaction_id: &str) -> Result<PaymentStatus, GatewayError>;
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    account_number: &'a str,
    routing_number: &'a str,
    amount: f64,
    description: &'a str,
}

/// Gateway reached over HTTP.
///
/// - `POST {base_url}/payments` submits a payment
/// - `GET {base_url}/payments/{transaction_id}` reads its status
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let parsed = Url::parse(base_url).map_err(|_| GatewayError::InvalidUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
            token,
        })
    }

    /// `base_url` extended by `segments`, each percent-encoded as a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read<T: serde::de::DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn submit(&self, request: &PaymentRequest) -> Result<PaymentReceipt, GatewayError> {
        let body = SubmitBody {
            account_number: &request.account_number,
            routing_number: &request.routing_number,
            amount: request.amount.to_f64(),
            description: &request.description,
        };
        let http = self.client.post(self.endpoint(&["payments"])?).json(&body);
        Self::read(self.authorize(http)).await
    }

    async fn status(&self, transaction_id: &str) -> Result<PaymentStatus, GatewayError> {
        let http = self
            .client
            .get(self.endpoint(&["payments", transaction_id])?);
        Self::read(self.authorize(http)).await
    }
}

/// Validates payment instructions and submits them with bounded retries.
pub struct PaymentClient<G> {
    gateway: G,
    retry: RetryPolicy,
}

impl<G: PaymentGateway> PaymentClient<G> {
    /// Three attempts, one second apart.
    pub fn default_retry() -> RetryPolicy {
        RetryPolicy::fixed(RetryPolicy::DEFAULT_ATTEMPTS, Duration::from_secs(1))
    }

    pub fn new(gateway: G, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Submit a payment.
    ///
    /// Arguments are checked before any gateway call. Gateway failures are
    /// retried; the last one is returned once attempts run out.
    pub async fn submit(
        &self,
        account: &str,
        routing: &str,
        amount: Amount,
        description: &str,
    ) -> PaymentResponse {
        if !amount.is_positive() {
            return Err(PaymentError::InvalidArgument("amount must be positive"));
        }
        if account.is_empty() {
            return Err(PaymentError::InvalidArgument("account number is empty"));
        }
        if routing.is_empty() {
            return Err(PaymentError::InvalidArgument("routing number is empty"));
        }

        let request = PaymentRequest {
            account_number: account.to_string(),
            routing_number: routing.to_string(),
            amount,
            description: description.to_string(),
        };

        let mut attempt = 0;
        loop {
            match self.gateway.submit(&request).await {
                Ok(receipt) => {
                    info!(
                        transaction_id = %receipt.transaction_id,
                        amount = %amount,
                        routing,
                        "ach payment submitted"
                    );
                    return Ok(receipt);
                }
                Err(e) => {
                    warn!(attempt = attempt + 1, amount = %amount, error = %e, "ach payment attempt failed");
                    if !self.retry.pause(attempt).await {
                        error!(attempts = attempt + 1, amount = %amount, "giving up on ach payment");
                        return Err(PaymentError::Exhausted {
                            attempts: attempt + 1,
                            source: e,
                        });
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Query a payment's status. Not retried.
    pub async fn get_status(&self, transaction_id: &str) -> Result<PaymentStatus, PaymentError> {
        if transaction_id.is_empty() {
            return Err(PaymentError::InvalidArgument("transaction id is empty"));
        }
        match self.gateway.status(transaction_id).await {
            Ok(status) => {
                info!(transaction_id, status = %status.status, "ach payment status");
                Ok(status)
            }
            Err(e) => {
                error!(transaction_id, error = %e, "ach payment status query failed");
                Err(PaymentError::StatusQuery(e))
            }
        }
    }
}
