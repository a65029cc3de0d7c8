//! 저장소 모듈.
//!
//! - `PriceVolumeStore`: PostgreSQL 증분 적재 (스테이징 테이블 경유 멱등 병합)
//! - `ResponseArchive`: 원시 응답 아카이브 (감사/재현용 부수 채널)
//! - `pgpass`: 콜론 구분 자격증명 파일에서 접속 URL 구성

pub mod archive;
pub mod pgpass;
pub mod price_volume;

pub use archive::ResponseArchive;
pub use pgpass::database_url_from_pgpass;
pub use price_volume::PriceVolumeStore;
