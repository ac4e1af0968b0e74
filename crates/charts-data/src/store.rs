//! 심볼별 가격 시계열 저장소.
//!
//! 하나의 `price_bars` 테이블에 `symbol` 컬럼을 키로 모든 심볼의 바를
//! 저장합니다. `(symbol, period_end)` 조합은 유일하며, 삽입 순서는
//! `period_end` 오름차순과 같습니다. 저장소는 추가 전용입니다: 이
//! 계층에서 바를 수정하거나 삭제하는 일은 없습니다.

use charts_core::bucket::validate_bucket_time;
use charts_core::PriceBar;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DataError, Result};

/// 가격 바 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct BarRecord {
    pub symbol: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub trade_count: i64,
}

impl BarRecord {
    /// 도메인 타입으로 변환.
    pub fn into_bar(self) -> PriceBar {
        PriceBar {
            symbol: self.symbol,
            period_start: self.period_start,
            period_end: self.period_end,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            trade_count: self.trade_count,
        }
    }
}

/// 심볼별 시계열 저장소.
///
/// 명시적으로 생성해서 수집 엔진과 비교 서비스에 주입합니다.
/// 내부 풀은 `Clone`으로 공유됩니다.
#[derive(Clone)]
pub struct SeriesStore {
    pool: SqlitePool,
}

impl SeriesStore {
    /// 데이터베이스에 연결합니다.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await
            .map_err(|e| DataError::Connection(e.to_string()))?;

        info!(url = %url, "시계열 저장소 연결");
        Ok(Self { pool })
    }

    /// 기존 연결 풀에서 저장소를 생성합니다.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 스키마를 초기화합니다 (이미 있으면 아무것도 하지 않음).
    ///
    /// `(symbol, period_end)` 기본 키가 중복 삽입을 막고, 같은 인덱스가
    /// `latest`의 내림차순 조회를 O(log n)으로 만듭니다.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_bars (
                symbol       TEXT    NOT NULL,
                period_start TEXT    NOT NULL,
                period_end   TEXT    NOT NULL,
                open         REAL    NOT NULL,
                high         REAL    NOT NULL,
                low          REAL    NOT NULL,
                close        REAL    NOT NULL,
                volume       REAL    NOT NULL,
                trade_count  INTEGER NOT NULL,
                PRIMARY KEY (symbol, period_end)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("price_bars 스키마 준비 완료");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(true)
    }

    /// 해당 심볼의 가장 최근 바를 조회합니다.
    ///
    /// 증분 수집의 재개 지점 계산에 사용됩니다. 바가 없으면 `None`.
    pub async fn latest(&self, symbol: &str) -> Result<Option<PriceBar>> {
        let record: Option<BarRecord> = sqlx::query_as(
            r#"
            SELECT symbol, period_start, period_end, open, high, low, close, volume, trade_count
            FROM price_bars
            WHERE symbol = ?1
            ORDER BY period_end DESC
            LIMIT 1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(BarRecord::into_bar))
    }

    /// 바 배치를 전부 삽입합니다 (전부-아니면-전무).
    ///
    /// 모든 바의 `period_end`는 삽입 전에 6시간 격자 검증을 거칩니다.
    /// 하나라도 `(symbol, period_end)`가 중복이면 배치 전체가 롤백되고
    /// `DataError::DuplicateBar`를 반환합니다. 배치는 트랜잭션 하나로
    /// 커밋되므로 동시에 읽는 쪽이 절반만 들어간 배치를 보는 일은
    /// 없습니다.
    pub async fn append(&self, symbol: &str, bars: &[PriceBar]) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        for bar in bars {
            validate_bucket_time(bar.period_end)?;
        }

        let mut tx = self.pool.begin().await?;
        for bar in bars {
            sqlx::query(
                r#"
                INSERT INTO price_bars
                    (symbol, period_start, period_end, open, high, low, close, volume, trade_count)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(symbol)
            .bind(bar.period_start)
            .bind(bar.period_end)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .bind(bar.trade_count)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(symbol = symbol, inserted = bars.len(), "바 배치 저장 완료");
        Ok(bars.len())
    }

    /// 바를 `period_end` 오름차순으로 조회합니다.
    ///
    /// `since`가 주어지면 `period_end >= since`인 바만 반환합니다.
    pub async fn query(
        &self,
        symbol: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceBar>> {
        let records: Vec<BarRecord> = match since {
            Some(since) => {
                sqlx::query_as(
                    r#"
                    SELECT symbol, period_start, period_end, open, high, low, close, volume, trade_count
                    FROM price_bars
                    WHERE symbol = ?1 AND period_end >= ?2
                    ORDER BY period_end ASC
                    "#,
                )
                .bind(symbol)
                .bind(since)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT symbol, period_start, period_end, open, high, low, close, volume, trade_count
                    FROM price_bars
                    WHERE symbol = ?1
                    ORDER BY period_end ASC
                    "#,
                )
                .bind(symbol)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(records.into_iter().map(BarRecord::into_bar).collect())
    }

    /// 해당 심볼의 저장된 바 수를 반환합니다.
    pub async fn count(&self, symbol: &str) -> Result<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM price_bars WHERE symbol = ?1")
            .bind(symbol)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }
}
