//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use std::time::Duration;

/// 설정이 없을 때 수집하는 기본 심볼 목록.
const DEFAULT_SYMBOLS: &[&str] = &[
    "BITSTAMP_SPOT_BTC_USD",
    "BITSTAMP_SPOT_XRP_USD",
    "BITSTAMP_SPOT_ETH_USD",
    "BITSTAMP_SPOT_LTC_USD",
    "BITSTAMP_SPOT_EUR_USD",
    "BITSTAMP_SPOT_BCH_USD",
];

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// CoinAPI 인증키 (수집 명령에만 필요)
    pub api_key: Option<String>,
    /// 수집 대상 심볼 (순서 고정)
    pub symbols: Vec<String>,
    /// CoinAPI 기본 URL 교체 (테스트/프록시용)
    pub base_url: Option<String>,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 수집 패스 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://coincharts.db?mode=rwc".to_string());

        let symbols = match std::env::var("HISTORY_SYMBOLS") {
            Ok(raw) => parse_symbols(&raw),
            Err(_) => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };
        if symbols.is_empty() {
            return Err(CollectorError::Config(
                "HISTORY_SYMBOLS에 심볼이 하나도 없습니다".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            api_key: std::env::var("COINAPI_KEY").ok(),
            symbols,
            base_url: std::env::var("COINAPI_BASE_URL").ok(),
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }

    /// 수집 명령에 필요한 CoinAPI 인증키를 반환합니다.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            CollectorError::Config("COINAPI_KEY 환경변수가 설정되지 않았습니다".to_string())
        })
    }
}

impl DaemonConfig {
    /// 수집 패스 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 쉼표로 구분된 심볼 목록 파싱
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols() {
        assert_eq!(
            parse_symbols("BITSTAMP_SPOT_BTC_USD, BITSTAMP_SPOT_ETH_USD"),
            vec!["BITSTAMP_SPOT_BTC_USD", "BITSTAMP_SPOT_ETH_USD"]
        );
        assert_eq!(parse_symbols("A,,B,"), vec!["A", "B"]);
        assert!(parse_symbols("").is_empty());
    }

    #[test]
    fn test_daemon_interval() {
        let daemon = DaemonConfig {
            interval_minutes: 60,
        };
        assert_eq!(daemon.interval(), Duration::from_secs(3600));
    }
}
