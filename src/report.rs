use std::io;

use serde::Serialize;

use crate::engine::AllocationPlan;

#[derive(Debug, Serialize)]
struct PlanRow<'a> {
    bucket: &'a str,
    share: String,
    amount: String,
    outcome: &'static str,
    transaction_id: &'a str,
    detail: String,
}

/// Write one csv row per bucket of `plan`, with a header line.
pub fn write_plan(writer: impl io::Write, plan: &AllocationPlan) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for allocation in plan.iter() {
        let (outcome, transaction_id, detail) = match &allocation.response {
            Some(Ok(receipt)) => ("paid", receipt.transaction_id.as_str(), receipt.status.clone()),
            Some(Err(e)) => ("failed", "", e.to_string()),
            None => ("skipped", "", "no account number".to_string()),
        };
        writer.serialize(PlanRow {
            bucket: allocation.bucket.name(),
            share: format!("{}%", allocation.share_bps / 100),
            amount: allocation.amount.to_string(),
            outcome,
            transaction_id,
            detail,
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// One-line human summary of `plan`.
pub fn summary(plan: &AllocationPlan) -> String {
    let signal = plan
        .signal
        .map_or_else(|| "unavailable".to_string(), |s| s.to_string());
    format!(
        "allocated {} of {} across {} buckets, {} paid, trend {}",
        plan.total_allocated(),
        plan.total,
        plan.len(),
        plan.paid_count(),
        signal
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use crate::engine::BucketAllocation;
    use crate::gateway::PaymentError;
    use crate::model::{Bucket, PaymentReceipt, TrendSignal};

    fn plan() -> AllocationPlan {
        AllocationPlan {
            total: Amount::from_float(10_000.0),
            signal: Some(TrendSignal::Unfavorable),
            buckets: vec![
                BucketAllocation {
                    bucket: Bucket::AlternativeAssets,
                    share_bps: 6_000,
                    amount: Amount::from_float(6_000.0),
                    response: Some(Ok(PaymentReceipt {
                        transaction_id: "ACH1".to_string(),
                        status: "success".to_string(),
                        details: serde_json::Map::new(),
                    })),
                },
                BucketAllocation {
                    bucket: Bucket::PublicEquities,
                    share_bps: 3_000,
                    amount: Amount::from_float(1_500.0),
                    response: Some(Err(PaymentError::InvalidArgument("amount must be positive"))),
                },
                BucketAllocation {
                    bucket: Bucket::DigitalAssets,
                    share_bps: 1_000,
                    amount: Amount::from_float(1_000.0),
                    response: None,
                },
            ],
        }
    }

    #[test]
    fn writes_one_row_per_bucket() {
        let mut out = Vec::new();
        write_plan(&mut out, &plan()).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "bucket,share,amount,outcome,transaction_id,detail");
        assert_eq!(lines[1], "Alternative Assets,60%,6000.0000,paid,ACH1,success");
        assert_eq!(
            lines[2],
            "Public Equities,30%,1500.0000,failed,,invalid argument: amount must be positive"
        );
        assert_eq!(lines[3], "Digital Assets,10%,1000.0000,skipped,,no account number");
    }

    #[test]
    fn summary_line() {
        assert_eq!(
            summary(&plan()),
            "allocated 8500.0000 of 10000.0000 across 3 buckets, 1 paid, trend unfavorable"
        );
    }
}
