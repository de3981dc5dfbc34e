use async_trait::async_trait;
use crate::{ScoresheetError, StockRecord};

/// Trait for upstream market data providers. Implementations own all I/O;
/// the scoring engines only ever see the returned record.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_record(&self, symbol: &str) -> Result<StockRecord, ScoresheetError>;
}
