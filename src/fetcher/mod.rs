pub mod traits;
pub mod yahoo;

pub use traits::PriceFetcher;
pub use yahoo::YahooFetcher;
