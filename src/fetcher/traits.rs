use crate::model::{FetchError, PriceObservation};

#[async_trait::async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Latest available close for `ticker`. One request, no retry.
    async fn latest_close(&self, ticker: &str) -> Result<PriceObservation, FetchError>;
}
