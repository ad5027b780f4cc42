use crate::Amount;
use crate::gateway::PaymentResponse;
use crate::model::{Bucket, TrendSignal};

/// One bucket's slice of an allocation and what happened to its payment.
#[derive(Debug)]
pub struct BucketAllocation {
    pub bucket: Bucket,
    pub share_bps: u32,
    /// Amount sent to the gateway, after any trend adjustment.
    pub amount: Amount,
    /// `None` when no account number could be generated and nothing was submitted.
    pub response: Option<PaymentResponse>,
}

impl BucketAllocation {
    pub fn is_paid(&self) -> bool {
        matches!(self.response, Some(Ok(_)))
    }
}

/// Per-bucket results of one allocation run, in allocation order.
#[derive(Debug)]
pub struct AllocationPlan {
    pub total: Amount,
    /// Trend signal applied to the equities bucket, if the predictor answered.
    pub signal: Option<TrendSignal>,
    pub buckets: Vec<BucketAllocation>,
}

impl AllocationPlan {
    pub fn get(&self, bucket: Bucket) -> Option<&BucketAllocation> {
        self.buckets.iter().find(|b| b.bucket == bucket)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketAllocation> + '_ {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of the amounts computed for every bucket, paid or not.
    pub fn total_allocated(&self) -> Amount {
        self.buckets.iter().map(|b| b.amount).sum()
    }

    pub fn paid_count(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_paid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::PaymentError;
    use crate::model::PaymentReceipt;

    fn allocation(bucket: Bucket, amount: i64, response: Option<PaymentResponse>) -> BucketAllocation {
        BucketAllocation {
            bucket,
            share_bps: bucket.share_bps(),
            amount: Amount::from_scaled(amount),
            response,
        }
    }

    fn receipt() -> PaymentResponse {
        Ok(PaymentReceipt {
            transaction_id: "ACH1".to_string(),
            status: "success".to_string(),
            details: serde_json::Map::new(),
        })
    }

    #[test]
    fn plan_accounting() {
        let plan = AllocationPlan {
            total: Amount::from_scaled(100),
            signal: None,
            buckets: vec![
                allocation(Bucket::AlternativeAssets, 60, Some(receipt())),
                allocation(
                    Bucket::PublicEquities,
                    30,
                    Some(Err(PaymentError::InvalidArgument("amount must be positive"))),
                ),
                allocation(Bucket::DigitalAssets, 10, None),
            ],
        };

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.total_allocated(), Amount::from_scaled(100));
        assert_eq!(plan.paid_count(), 1);
        assert!(plan.get(Bucket::AlternativeAssets).unwrap().is_paid());
        assert!(!plan.get(Bucket::PublicEquities).unwrap().is_paid());
        assert!(plan.get(Bucket::DigitalAssets).unwrap().response.is_none());
    }

    #[test]
    fn missing_bucket() {
        let plan = AllocationPlan {
            total: Amount::default(),
            signal: None,
            buckets: Vec::new(),
        };
        assert!(plan.is_empty());
        assert!(plan.get(Bucket::DigitalAssets).is_none());
    }
}
