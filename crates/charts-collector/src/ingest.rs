//! 심볼별 증분 수집 엔진.
//!
//! 한 사이클 = 재개 지점 계산 → 기한 확인 → 조회 → 검증/저장.
//! 재개 지점은 매 사이클 저장소에서 다시 계산하며 사이클 사이에 아무
//! 상태도 들고 다니지 않습니다. 덕분에 재시작이나 부분 실패 후에도 같은
//! 사이클을 그대로 반복하면 됩니다: 이미 저장된 구간은 기한 확인이나
//! 중복 제약이 걸러냅니다.

use charts_core::bucket::{first_known_time, validate_bucket_time, BUCKET_HOURS};
use charts_data::{DataError, QuoteSource, SeriesStore};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// 사이클당 최대 조회 바 수 (6시간봉 기준 약 1년치).
pub const FETCH_LIMIT: u32 = 1500;

/// 한 수집 사이클의 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 마지막 바 이후 6시간이 지나지 않아 아무것도 하지 않음.
    /// 에러가 아니라 폴링 사이의 정상 상태입니다.
    NotDue,
    /// 조회했지만 제공자에 아직 새 데이터가 없음
    UpToDate,
    /// 새 바 N개 저장
    Appended(usize),
}

/// 증분 수집 엔진.
///
/// 저장소 핸들과 시세 소스를 명시적으로 주입받아 소유합니다.
pub struct IngestionEngine<S: QuoteSource> {
    store: SeriesStore,
    source: S,
}

impl<S: QuoteSource> IngestionEngine<S> {
    /// 새 수집 엔진을 생성합니다.
    pub fn new(store: SeriesStore, source: S) -> Self {
        Self { store, source }
    }

    /// 한 심볼에 대해 수집 사이클 하나를 실행합니다.
    ///
    /// `DuplicateBar`는 재개 지점과 제공자 응답이 어긋났다는 뜻이므로
    /// 여기서 삼키지 않고 그대로 전파합니다. 사이클 안에서 재시도는
    /// 하지 않습니다: 다음 주기의 사이클이 같은 재개 로직으로 자연히
    /// 재시도합니다.
    pub async fn run_cycle(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<CycleOutcome, DataError> {
        // 1. 재개 지점: 저장소의 마지막 바, 없으면 고정 기준 시각
        let resume_from = match self.store.latest(symbol).await? {
            Some(last) => {
                debug!(symbol = symbol, last = %last.period_end, "마지막 저장 바 확인");
                last.period_end
            }
            None => {
                debug!(
                    symbol = symbol,
                    default = %first_known_time(),
                    "로컬 데이터 없음, 기준 시각부터 시작"
                );
                first_known_time()
            }
        };
        // 저장소가 격자를 벗어난 시각을 돌려주면 여기서 사이클이 실패한다
        validate_bucket_time(resume_from)?;

        // 2. 기한 확인: 다음 버킷이 아직 닫히지 않았으면 부작용 없이 종료
        if now - resume_from < Duration::hours(BUCKET_HOURS) {
            debug!(
                symbol = symbol,
                resume_from = %resume_from,
                now = %now,
                "아직 6시간이 지나지 않음"
            );
            return Ok(CycleOutcome::NotDue);
        }

        // 3. 조회 구간: 재개 지점 다음 버킷부터
        let start_bucket = resume_from + Duration::hours(BUCKET_HOURS);
        let bars = self.source.fetch(symbol, start_bucket, FETCH_LIMIT).await?;
        if bars.is_empty() {
            debug!(symbol = symbol, start = %start_bucket, "제공자에 새 데이터 없음");
            return Ok(CycleOutcome::UpToDate);
        }

        // 4. 저장 (전부-아니면-전무, 중복은 전파)
        let inserted = self.store.append(symbol, &bars).await?;
        info!(symbol = symbol, inserted = inserted, "새 바 저장 완료");
        Ok(CycleOutcome::Appended(inserted))
    }
}
