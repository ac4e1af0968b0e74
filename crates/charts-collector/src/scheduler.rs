//! 전체 심볼을 도는 수집 루프.
//!
//! 설정된 심볼들을 순서대로 하나씩 처리합니다. 쓰기 경합을 만들지 않는
//! 단일 순차 루프이며, 한 심볼의 실패는 그 심볼의 이번 사이클만
//! 중단시킵니다.

use charts_data::{DataError, QuoteSource};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::ingest::{CycleOutcome, IngestionEngine};
use crate::stats::CollectionStats;

/// 고정 심볼 목록에 대한 수집 스케줄러.
pub struct Scheduler<S: QuoteSource> {
    engine: IngestionEngine<S>,
    symbols: Vec<String>,
    interval: std::time::Duration,
}

impl<S: QuoteSource> Scheduler<S> {
    /// 새 스케줄러를 생성합니다.
    pub fn new(
        engine: IngestionEngine<S>,
        symbols: Vec<String>,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            engine,
            symbols,
            interval,
        }
    }

    /// 모든 심볼에 대해 사이클을 한 번씩 순차 실행합니다.
    ///
    /// 실패한 심볼은 로그만 남기고 다음 심볼로 진행합니다. 중복 바와
    /// 격자 위반은 체크포인트 손상 신호이므로 error 레벨로 크게 알리고,
    /// 일시적 제공자 실패는 다음 주기의 자연 재시도에 맡깁니다.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> CollectionStats {
        let start = Instant::now();
        let mut stats = CollectionStats::new();

        for symbol in &self.symbols {
            stats.total += 1;

            match self.engine.run_cycle(symbol, now).await {
                Ok(CycleOutcome::Appended(inserted)) => {
                    stats.success += 1;
                    stats.total_bars += inserted;
                }
                Ok(CycleOutcome::UpToDate) => {
                    stats.up_to_date += 1;
                }
                Ok(CycleOutcome::NotDue) => {
                    stats.not_due += 1;
                }
                Err(e @ (DataError::DuplicateBar(_) | DataError::InvalidBucketTime(_))) => {
                    stats.errors += 1;
                    error!(
                        symbol = %symbol,
                        error = %e,
                        "수집 불변식 위반, 운영자 확인 필요"
                    );
                }
                Err(e) => {
                    stats.errors += 1;
                    warn!(
                        symbol = %symbol,
                        error = %e,
                        "수집 실패, 다음 주기에 재시도"
                    );
                }
            }
        }

        stats.elapsed = start.elapsed();
        stats
    }

    /// 종료 신호가 올 때까지 고정 주기로 수집을 반복합니다.
    ///
    /// 첫 패스는 즉시 실행되고, 이후 패스 경계에서만 협조적으로
    /// 종료합니다.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("종료 신호 수신, 수집 루프 종료");
                    break;
                }
                _ = interval.tick() => {
                    let stats = self.run_pass(Utc::now()).await;
                    stats.log_summary("가격 수집");
                }
            }
        }
    }
}
