//! Core domain types shared by the codec, resolver, gateway and allocator.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::Amount;
use crate::routing;

/// A generated bank account number.
///
/// Numeric account numbers carry a trailing Luhn check digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 9-digit ABA routing number that passed checksum validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingNumber(String);

impl RoutingNumber {
    /// Returns `None` unless `value` passes [`routing::validate`].
    pub fn parse(value: &str) -> Option<Self> {
        routing::validate(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoutingNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("'{s}' is not a valid ABA routing number"))
    }
}

impl fmt::Display for RoutingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named allocation target receiving a fixed share of a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    AlternativeAssets,
    PublicEquities,
    DigitalAssets,
}

impl Bucket {
    /// Buckets in allocation order.
    pub const ALL: [Bucket; 3] = [
        Bucket::AlternativeAssets,
        Bucket::PublicEquities,
        Bucket::DigitalAssets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Bucket::AlternativeAssets => "Alternative Assets",
            Bucket::PublicEquities => "Public Equities",
            Bucket::DigitalAssets => "Digital Assets",
        }
    }

    /// Share of the total, in basis points.
    pub fn share_bps(self) -> u32 {
        match self {
            Bucket::AlternativeAssets => 6_000,
            Bucket::PublicEquities => 3_000,
            Bucket::DigitalAssets => 1_000,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrete market trend label produced by an external predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrendSignal {
    #[default]
    Favorable,
    Unfavorable,
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendSignal::Favorable => f.write_str("favorable"),
            TrendSignal::Unfavorable => f.write_str("unfavorable"),
        }
    }
}

/// A single ACH payment instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub account_number: String,
    pub routing_number: String,
    pub amount: Amount,
    pub description: String,
}

/// Successful gateway answer to a payment submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub status: String,
    /// Gateway-specific fields returned alongside the id and status.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Gateway answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentStatus {
    pub transaction_id: String,
    pub status: String,
}
