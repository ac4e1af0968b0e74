//! 6시간 버킷 격자 검증 및 계산.
//!
//! 시세 제공자의 데이터 모델은 6시간 봉으로 고정되어 있습니다. 버킷 시간은
//! UTC 기준 00:00 / 06:00 / 12:00 / 18:00 정각이며 분/초/나노초는 모두
//! 0이어야 합니다. 시스템에 들어오고 나가는 모든 시각은 이 모듈 하나를
//! 통해 검증되며, 위반은 절대 조용히 보정하지 않고 에러로 반환합니다.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use thiserror::Error;

/// 버킷 간격 (시간 단위).
pub const BUCKET_HOURS: i64 = 6;

/// 로컬 데이터가 전혀 없는 심볼의 수집 기준 시각.
pub fn first_known_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 1, 9, 0, 0, 0).unwrap()
}

/// 6시간 격자 위반.
///
/// 저장소에 들어가는 모든 바와 재개 지점 계산에서 이 검증이 수행됩니다.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("6시간 격자를 벗어난 시각 {instant}: {reason}")]
pub struct InvalidBucketTime {
    /// 위반한 시각
    pub instant: DateTime<Utc>,
    /// 위반한 제약
    pub reason: String,
}

/// 버킷 시간 검증.
///
/// `DateTime<Utc>` 타입이 UTC를 보장하므로 나머지 제약만 확인합니다:
/// 시(hour)는 6의 배수, 분/초/나노초는 모두 0.
pub fn validate_bucket_time(t: DateTime<Utc>) -> Result<(), InvalidBucketTime> {
    if t.hour() % BUCKET_HOURS as u32 != 0 {
        return Err(InvalidBucketTime {
            instant: t,
            reason: format!("hour {}은(는) 6의 배수가 아님", t.hour()),
        });
    }
    for (field, value) in [
        ("minute", t.minute()),
        ("second", t.second()),
        ("nanosecond", t.nanosecond()),
    ] {
        if value != 0 {
            return Err(InvalidBucketTime {
                instant: t,
                reason: format!("{} {}은(는) 0이 아님", field, value),
            });
        }
    }
    Ok(())
}

/// 다음 버킷 시간으로 올림.
///
/// `t`보다 큰 가장 작은 버킷 시간을 반환합니다. `t`가 이미 버킷 경계에
/// 있어도 `t` 자신이 아니라 다음 버킷을 반환합니다 (엄격한 올림).
pub fn round_up_to_next_bucket(t: DateTime<Utc>) -> DateTime<Utc> {
    let increment = BUCKET_HOURS - (t.hour() as i64 % BUCKET_HOURS);
    let bumped = t + Duration::hours(increment);
    bumped
        .with_minute(0)
        .and_then(|v| v.with_second(0))
        .and_then(|v| v.with_nanosecond(0))
        .expect("분/초/나노초를 0으로 만드는 것은 항상 유효함")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_validate_accepts_grid_hours() {
        for hour in [0, 6, 12, 18] {
            assert!(validate_bucket_time(utc(2018, 1, 9, hour, 0, 0)).is_ok());
        }
    }

    #[test]
    fn test_validate_rejects_off_grid_hours() {
        for hour in [1, 5, 7, 11, 13, 17, 19, 23] {
            assert!(validate_bucket_time(utc(2018, 1, 9, hour, 0, 0)).is_err());
        }
    }

    #[test]
    fn test_validate_rejects_nonzero_subfields() {
        assert!(validate_bucket_time(utc(2018, 1, 9, 6, 1, 0)).is_err());
        assert!(validate_bucket_time(utc(2018, 1, 9, 6, 0, 30)).is_err());
        let t = utc(2018, 1, 9, 6, 0, 0).with_nanosecond(500).unwrap();
        assert!(validate_bucket_time(t).is_err());
    }

    #[test]
    fn test_round_up_from_mid_bucket() {
        assert_eq!(
            round_up_to_next_bucket(utc(2018, 1, 9, 1, 30, 15)),
            utc(2018, 1, 9, 6, 0, 0)
        );
        assert_eq!(
            round_up_to_next_bucket(utc(2018, 1, 9, 17, 0, 0)),
            utc(2018, 1, 9, 18, 0, 0)
        );
    }

    #[test]
    fn test_round_up_is_strict_on_grid_input() {
        // 이미 버킷 경계인 입력은 자기 자신이 아니라 다음 버킷으로 간다
        assert_eq!(
            round_up_to_next_bucket(utc(2018, 1, 9, 6, 0, 0)),
            utc(2018, 1, 9, 12, 0, 0)
        );
    }

    #[test]
    fn test_round_up_crosses_midnight() {
        assert_eq!(
            round_up_to_next_bucket(utc(2018, 1, 9, 23, 59, 59)),
            utc(2018, 1, 10, 0, 0, 0)
        );
    }

    #[test]
    fn test_round_up_result_is_valid_and_greater() {
        for hour in 0..24 {
            for minute in [0, 1, 59] {
                let t = utc(2018, 1, 9, hour, minute, 0);
                let next = round_up_to_next_bucket(t);
                assert!(next > t, "{} -> {}", t, next);
                assert!(validate_bucket_time(next).is_ok());
                // 최소성: 한 버킷 전은 t 이하여야 한다
                assert!(next - Duration::hours(BUCKET_HOURS) <= t);
            }
        }
    }

    #[test]
    fn test_first_known_time_is_on_grid() {
        assert!(validate_bucket_time(first_known_time()).is_ok());
        assert_eq!(first_known_time(), utc(2018, 1, 9, 0, 0, 0));
    }
}
