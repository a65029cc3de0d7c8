//! 데이터 수집 모듈.

pub mod exchange_sync;
pub mod price_volume_collect;

pub use exchange_sync::{parse_pair_args, sync_exchanges, PairKey};
pub use price_volume_collect::collect_price_volumes;
