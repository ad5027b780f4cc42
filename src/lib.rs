pub mod account;
pub mod amount;
pub mod config;
pub mod engine;
pub mod gateway;
pub mod model;
pub mod report;
pub mod retry;
pub mod routing;
pub mod trend;

#[cfg(test)]
mod testing;

pub use amount::Amount;
pub use engine::{AllocationPlan, Allocator};
pub use model::{AccountNumber, Bucket, RoutingNumber, TrendSignal};
