//! Allocation engine.
//!
//! Splits a lump sum across the fixed [`Bucket`]s, scales the equities share
//! by a market trend signal, and pays each bucket out to a freshly generated
//! account. Buckets are processed one at a time; a failing bucket never stops
//! the others.

use tracing::{error, info, warn};

use crate::Amount;
use crate::account::{AccountSource, RandomAccounts};
use crate::gateway::{PaymentClient, PaymentGateway, PaymentResponse};
use crate::model::{Bucket, RoutingNumber, TrendSignal};
use crate::trend::TrendPredictor;

mod state;
pub use state::{AllocationPlan, BucketAllocation};

/// Market symbol whose trend drives the equities bucket.
pub const DEFAULT_SYMBOL: &str = "NVDA";

/// The allocation engine.
///
/// Pays every bucket against a single fixed routing number.
pub struct Allocator<G, P, A = RandomAccounts> {
    payments: PaymentClient<G>,
    predictor: P,
    accounts: A,
    routing: RoutingNumber,
    symbol: String,
}

impl<G: PaymentGateway, P: TrendPredictor> Allocator<G, P> {
    pub fn new(payments: PaymentClient<G>, predictor: P, routing: RoutingNumber) -> Self {
        Self {
            payments,
            predictor,
            accounts: RandomAccounts::default(),
            routing,
            symbol: DEFAULT_SYMBOL.to_string(),
        }
    }
}

/// Public API
impl<G: PaymentGateway, P: TrendPredictor, A: AccountSource> Allocator<G, P, A> {
    /// Replace the source of per-bucket account numbers.
    pub fn with_accounts<B: AccountSource>(self, accounts: B) -> Allocator<G, P, B> {
        Allocator {
            payments: self.payments,
            predictor: self.predictor,
            accounts,
            routing: self.routing,
            symbol: self.symbol,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn payments(&self) -> &PaymentClient<G> {
        &self.payments
    }

    /// Split `total` across all buckets and pay each one.
    ///
    /// Always returns one entry per bucket, in [`Bucket::ALL`] order.
    pub async fn allocate_and_spend(&self, total: Amount, description: &str) -> AllocationPlan {
        let mut signal = None;
        let mut buckets = Vec::with_capacity(Bucket::ALL.len());

        for bucket in Bucket::ALL {
            let mut amount = total.apportion(bucket.share_bps());
            if bucket == Bucket::PublicEquities {
                signal = self.predict().await;
                if signal == Some(TrendSignal::Unfavorable) {
                    // business rule: halve equities on a negative outlook
                    amount = amount.halve();
                }
            }

            let payment_description = format!("{description} - Allocation to {bucket}");
            let response = self.pay(amount, &payment_description, None).await;
            Self::log_result(bucket, amount, &response);

            buckets.push(BucketAllocation {
                bucket,
                share_bps: bucket.share_bps(),
                amount,
                response,
            });
        }

        AllocationPlan {
            total,
            signal,
            buckets,
        }
    }

    /// Make a single payment to `account`, or to a freshly generated one.
    ///
    /// Returns `None` without calling the gateway if no account could be generated.
    pub async fn spend_for_beneficiary(
        &self,
        amount: Amount,
        description: &str,
        account: Option<&str>,
    ) -> Option<PaymentResponse> {
        let response = self.pay(amount, description, account).await;
        match &response {
            Some(Ok(receipt)) => info!(
                amount = %amount,
                transaction_id = %receipt.transaction_id,
                "beneficiary payment submitted"
            ),
            Some(Err(e)) => warn!(amount = %amount, reason = %e, "beneficiary payment failed"),
            None => {}
        }
        response
    }
}

/// Private API
impl<G: PaymentGateway, P: TrendPredictor, A: AccountSource> Allocator<G, P, A> {
    /// Ask the predictor for a signal. Errors are logged and yield `None`.
    async fn predict(&self) -> Option<TrendSignal> {
        match self.predictor.predict(&self.symbol).await {
            Ok(signal) => {
                info!(symbol = %self.symbol, %signal, "trend prediction");
                Some(signal)
            }
            Err(e) => {
                warn!(symbol = %self.symbol, reason = %e, "trend prediction failed, keeping full allocation");
                None
            }
        }
    }

    async fn pay(
        &self,
        amount: Amount,
        description: &str,
        account: Option<&str>,
    ) -> Option<PaymentResponse> {
        let generated;
        let account = match account {
            Some(account) => account,
            None => match self.accounts.next_account() {
                Ok(number) => {
                    generated = number;
                    generated.as_str()
                }
                Err(e) => {
                    error!(reason = %e, "failed to generate account number");
                    return None;
                }
            },
        };

        Some(
            self.payments
                .submit(account, self.routing.as_str(), amount, description)
                .await,
        )
    }

    /// Small helper to log per-bucket results
    fn log_result(bucket: Bucket, amount: Amount, response: &Option<PaymentResponse>) {
        match response {
            Some(Ok(receipt)) => info!(
                bucket = %bucket,
                amount = %amount,
                transaction_id = %receipt.transaction_id,
                "allocation paid"
            ),
            Some(Err(e)) => warn!(
                bucket = %bucket,
                amount = %amount,
                reason = %e,
                "allocation payment failed"
            ),
            None => warn!(
                bucket = %bucket,
                amount = %amount,
                "allocation skipped, no account number"
            ),
        }
    }
}
