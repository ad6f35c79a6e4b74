pub mod client;
pub mod error;

pub use client::RateFeedClient;
pub use error::RatesError;
