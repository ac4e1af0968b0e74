//! 데이터 계층 오류 타입.

use charts_core::bucket::InvalidBucketTime;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 6시간 격자 위반
    #[error(transparent)]
    InvalidBucketTime(#[from] InvalidBucketTime),

    /// 이미 저장된 기간 종료 시각과 중복되는 바.
    ///
    /// 재개 지점 계산과 제공자 응답이 어긋났다는 신호이므로
    /// 절대 조용히 삼키지 않습니다.
    #[error("중복 바: {0}")]
    DuplicateBar(String),

    /// 시세 제공자 요청 실패 (전송/인증/요청 한도).
    ///
    /// 일시적 오류로 취급되며, 제공자가 알려준 남은 요청 수 힌트를
    /// 함께 전달합니다.
    #[error("시세 제공자 사용 불가: {reason} (남은 요청 수: {remaining_quota:?})")]
    SourceUnavailable {
        reason: String,
        remaining_quota: Option<i64>,
    },

    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    Connection(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    Query(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                // SQLite 고유 제약 위반 (1555: PRIMARY KEY, 2067: UNIQUE 인덱스)
                if code == "1555" || code == "2067" {
                    DataError::DuplicateBar(db_err.message().to_string())
                } else {
                    DataError::Query(db_err.message().to_string())
                }
            }
            _ => DataError::Query(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_invalid_bucket_time_converts() {
        let err = InvalidBucketTime {
            instant: Utc.with_ymd_and_hms(2018, 1, 9, 7, 0, 0).unwrap(),
            reason: "hour 7은(는) 6의 배수가 아님".to_string(),
        };
        let data_err: DataError = err.into();
        assert!(matches!(data_err, DataError::InvalidBucketTime(_)));
    }
}
