//! Coincharts data collector CLI.

use charts_analytics::ComparisonService;
use charts_collector::config::parse_symbols;
use charts_collector::{CollectorConfig, CollectorError, IngestionEngine, Scheduler};
use charts_core::logging::{init_logging, LogConfig, LogFormat};
use charts_data::{CoinApiClient, SeriesStore};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "charts-collector")]
#[command(about = "Coincharts OHLCV Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// 모든 심볼에 대해 수집 패스를 한 번 실행
    Update {
        /// 특정 심볼만 수집 (쉼표로 구분, 예: "BITSTAMP_SPOT_BTC_USD,BITSTAMP_SPOT_ETH_USD")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 데몬 모드: 고정 주기로 수집 패스 반복
    Daemon,

    /// 저장된 시계열의 정규화 평균을 출력
    Compare {
        /// 이 시각 이후만 비교 (RFC 3339, 예: "2018-01-09T17:00:00Z")
        #[arg(long)]
        since: Option<String>,

        /// 비교할 심볼 (쉼표로 구분, 기본: 설정된 전체 심볼)
        #[arg(long)]
        symbols: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(LogConfig::new(cli.log_level.as_str()).with_format(cli.log_format))?;
    tracing::info!("Coincharts Collector 시작");

    let config = CollectorConfig::from_env()?;
    tracing::debug!(database_url = %config.database_url, symbols = config.symbols.len(), "설정 로드 완료");

    let store = SeriesStore::connect(&config.database_url).await?;
    store.init_schema().await?;
    tracing::info!("데이터베이스 준비 완료");

    match cli.command {
        Commands::Update { symbols } => {
            let scheduler = build_scheduler(&config, store, symbols)?;
            let stats = scheduler.run_pass(Utc::now()).await;
            stats.log_summary("가격 수집");
        }
        Commands::Daemon => {
            tracing::info!(
                interval_minutes = config.daemon.interval_minutes,
                symbols = config.symbols.len(),
                "데몬 모드 시작"
            );
            let scheduler = build_scheduler(&config, store, None)?;
            scheduler.run().await;
        }
        Commands::Compare { since, symbols } => {
            let since = since
                .map(|s| s.parse::<DateTime<Utc>>())
                .transpose()
                .map_err(|e| CollectorError::Config(format!("since 파싱 실패: {}", e)))?;
            let symbols = resolve_symbols(&config, symbols);

            let service = ComparisonService::new(store);
            for (time, value) in service.compare(&symbols, since).await? {
                println!("{}\t{:.6}", time.to_rfc3339(), value);
            }
        }
    }

    tracing::info!("Coincharts Collector 종료");
    Ok(())
}

/// 설정과 CLI 인자로 스케줄러를 조립합니다.
fn build_scheduler(
    config: &CollectorConfig,
    store: SeriesStore,
    symbols: Option<String>,
) -> Result<Scheduler<CoinApiClient>, CollectorError> {
    let mut client = CoinApiClient::new(config.require_api_key()?);
    if let Some(base_url) = &config.base_url {
        client = client.with_base_url(base_url.as_str());
    }

    let engine = IngestionEngine::new(store, client);
    Ok(Scheduler::new(
        engine,
        resolve_symbols(config, symbols),
        config.daemon.interval(),
    ))
}

/// CLI 인자의 심볼 목록이 있으면 그것을, 없으면 설정값을 사용합니다.
fn resolve_symbols(config: &CollectorConfig, symbols: Option<String>) -> Vec<String> {
    match symbols {
        Some(raw) => parse_symbols(&raw),
        None => config.symbols.clone(),
    }
}
