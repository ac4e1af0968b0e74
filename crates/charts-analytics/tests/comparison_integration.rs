//! Integration tests for ComparisonService against an in-memory store.

use charts_analytics::{ComparisonError, ComparisonService};
use charts_core::PriceBar;
use charts_data::SeriesStore;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;

fn bucket(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 1, 9, 0, 0, 0).unwrap() + Duration::hours(6 * n)
}

fn bar(symbol: &str, n: i64, close: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        period_start: bucket(n - 1),
        period_end: bucket(n),
        open: close,
        high: close,
        low: close,
        close,
        volume: 10.0,
        trade_count: 5,
    }
}

async fn seeded_store() -> SeriesStore {
    // In-memory SQLite gives every connection its own database, so the
    // pool must be pinned to a single connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SeriesStore::from_pool(pool);
    store.init_schema().await.unwrap();
    store
}

#[tokio::test]
async fn compare_averages_normalized_series() {
    let store = seeded_store().await;

    // Both series normalize to [0, 1, 0.5] despite different price scales.
    let btc: Vec<PriceBar> = [10.0, 20.0, 15.0]
        .iter()
        .enumerate()
        .map(|(i, &c)| bar("BTC", i as i64, c))
        .collect();
    let eth: Vec<PriceBar> = [100.0, 200.0, 150.0]
        .iter()
        .enumerate()
        .map(|(i, &c)| bar("ETH", i as i64, c))
        .collect();
    store.append("BTC", &btc).await.unwrap();
    store.append("ETH", &eth).await.unwrap();

    let service = ComparisonService::new(store);
    let symbols = vec!["BTC".to_string(), "ETH".to_string()];
    let points = service.compare(&symbols, None).await.unwrap();

    assert_eq!(points.len(), 3);
    let values: Vec<f64> = points.iter().map(|&(_, v)| v).collect();
    assert_eq!(values, vec![0.0, 1.0, 0.5]);
    let times: Vec<DateTime<Utc>> = points.iter().map(|&(t, _)| t).collect();
    assert_eq!(times, vec![bucket(0), bucket(1), bucket(2)]);
}

#[tokio::test]
async fn compare_is_bounded_by_shortest_series() {
    let store = seeded_store().await;

    let long: Vec<PriceBar> = (0..5).map(|i| bar("BTC", i, i as f64)).collect();
    let short: Vec<PriceBar> = (0..2).map(|i| bar("ETH", i, i as f64)).collect();
    store.append("BTC", &long).await.unwrap();
    store.append("ETH", &short).await.unwrap();

    let service = ComparisonService::new(store);
    let symbols = vec!["BTC".to_string(), "ETH".to_string()];
    let points = service.compare(&symbols, None).await.unwrap();
    assert_eq!(points.len(), 2);
}

#[tokio::test]
async fn compare_since_bound_rounds_up_to_the_grid() {
    let store = seeded_store().await;

    let bars: Vec<PriceBar> = (0..5).map(|i| bar("BTC", i, i as f64)).collect();
    store.append("BTC", &bars).await.unwrap();

    let service = ComparisonService::new(store);
    let symbols = vec!["BTC".to_string()];

    // 11:00 is off-grid and rounds up to 12:00 (= bucket 2).
    let since = Utc.with_ymd_and_hms(2018, 1, 9, 11, 0, 0).unwrap();
    let points = service.compare(&symbols, Some(since)).await.unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].0, bucket(2));
    // The window re-normalizes on its own range: closes 2/3/4 map to [0, 0.5, 1].
    let values: Vec<f64> = points.iter().map(|&(_, v)| v).collect();
    assert_eq!(values, vec![0.0, 0.5, 1.0]);
}

#[tokio::test]
async fn compare_flat_series_fails_with_degenerate_range() {
    let store = seeded_store().await;

    let flat: Vec<PriceBar> = (0..3).map(|i| bar("EUR", i, 1.0)).collect();
    store.append("EUR", &flat).await.unwrap();

    let service = ComparisonService::new(store);
    let symbols = vec!["EUR".to_string()];
    let err = service.compare(&symbols, None).await.unwrap_err();
    assert!(matches!(err, ComparisonError::Analytics(_)), "{:?}", err);
}

#[tokio::test]
async fn compare_unknown_symbol_yields_empty_stream() {
    let store = seeded_store().await;
    store.append("BTC", &[bar("BTC", 0, 1.0), bar("BTC", 1, 2.0)]).await.unwrap();

    let service = ComparisonService::new(store);
    let symbols = vec!["BTC".to_string(), "XRP".to_string()];
    let points = service.compare(&symbols, None).await.unwrap();
    assert!(points.is_empty());
}
