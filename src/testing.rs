//! Test doubles for the crate's collaborator seams.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::account::{AccountSource, CodecError, RandomAccounts};
use crate::gateway::{GatewayError, PaymentGateway};
use crate::model::{AccountNumber, PaymentReceipt, PaymentRequest, PaymentStatus, TrendSignal};
use crate::trend::{PredictorError, TrendPredictor};

/// Gateway failing its first `fail_first` calls, then succeeding. Records submissions.
pub struct ScriptedGateway {
    fail_first: usize,
    submits: AtomicUsize,
    status_queries: AtomicUsize,
    requests: Mutex<Vec<PaymentRequest>>,
}

impl ScriptedGateway {
    pub fn succeeding() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(fail_first: usize) -> Self {
        Self {
            fail_first,
            submits: AtomicUsize::new(0),
            status_queries: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn status_queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    /// Requests that reached the gateway, including failed attempts.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn submit(&self, request: &PaymentRequest) -> Result<PaymentReceipt, GatewayError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if n < self.fail_first {
            return Err(unavailable());
        }
        Ok(PaymentReceipt {
            transaction_id: format!("ACH{:010}", n + 1),
            status: "success".to_string(),
            details: serde_json::Map::new(),
        })
    }

    async fn status(&self, transaction_id: &str) -> Result<PaymentStatus, GatewayError> {
        let n = self.status_queries.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            return Err(unavailable());
        }
        Ok(PaymentStatus {
            transaction_id: transaction_id.to_string(),
            status: "completed".to_string(),
        })
    }
}

fn unavailable() -> GatewayError {
    GatewayError::Rejected {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

/// Predictor that always fails.
pub struct BrokenPredictor;

#[async_trait]
impl TrendPredictor for BrokenPredictor {
    async fn predict(&self, _symbol: &str) -> Result<TrendSignal, PredictorError> {
        Err(PredictorError::Unavailable("model not trained".to_string()))
    }
}

/// Account source whose `fail_on`-th call (zero-based) fails.
pub struct FlakyAccounts {
    fail_on: usize,
    calls: AtomicUsize,
}

impl FlakyAccounts {
    pub fn failing_on(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AccountSource for FlakyAccounts {
    fn next_account(&self) -> Result<AccountNumber, CodecError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_on {
            return Err(CodecError::InvalidLength(0));
        }
        RandomAccounts::default().next_account()
    }
}
