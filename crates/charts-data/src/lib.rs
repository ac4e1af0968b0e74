//! 가격 시계열 저장 및 시세 조회.
//!
//! 이 crate는 다음을 제공합니다:
//! - 심볼별 가격 바 저장소 (SQLite, 전부-아니면-전무 배치 삽입)
//! - 시세 제공자 추상화와 CoinAPI 클라이언트
//! - 데이터 계층 오류 타입

pub mod error;
pub mod source;
pub mod store;

pub use error::{DataError, Result};
pub use source::{CoinApiClient, QuoteSource};
pub use store::{BarRecord, SeriesStore};
