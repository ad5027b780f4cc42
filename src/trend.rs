//! Market trend signal consumed by the allocator.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::TrendSignal;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("trend predictor unavailable: {0}")]
    Unavailable(String),
}

/// Produces a favorable/unfavorable label for a market symbol.
#[async_trait]
pub trait TrendPredictor: Send + Sync {
    async fn predict(&self, symbol: &str) -> Result<TrendSignal, PredictorError>;
}

/// Predictor that always answers with the same signal, whatever the symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTrend(pub TrendSignal);

#[async_trait]
impl TrendPredictor for StaticTrend {
    async fn predict(&self, _symbol: &str) -> Result<TrendSignal, PredictorError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_trend_ignores_symbol() {
        let predictor = StaticTrend(TrendSignal::Unfavorable);
        assert_eq!(predictor.predict("NVDA").await.unwrap(), TrendSignal::Unfavorable);
        assert_eq!(predictor.predict("").await.unwrap(), TrendSignal::Unfavorable);
    }
}
