//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 한 수집 패스의 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 실행한 사이클 수
    pub total: usize,
    /// 새 바를 저장한 사이클 수
    pub success: usize,
    /// 에러로 끝난 사이클 수
    pub errors: usize,
    /// 아직 6시간이 지나지 않아 건너뛴 사이클 수
    pub not_due: usize,
    /// 조회했지만 제공자에 새 데이터가 없던 사이클 수
    pub up_to_date: usize,
    /// 저장된 총 바 수
    pub total_bars: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((self.total - self.errors) as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            not_due = self.not_due,
            up_to_date = self.up_to_date,
            total_bars = self.total_bars,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 패스 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = CollectionStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.total = 4;
        stats.errors = 1;
        assert_eq!(stats.success_rate(), 75.0);
    }
}
