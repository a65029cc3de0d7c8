//! 도메인 모델.

pub mod exchange;
pub mod price_volume;

pub use exchange::{Exchange, ExchangeSummary, TradingPair, VolumeRole, VolumeStat};
pub use price_volume::{PriceVolumeRow, TimeBucket};
