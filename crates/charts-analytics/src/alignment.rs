//! 시계열 정규화 및 lockstep 평균.
//!
//! 시작 시점과 길이가 제각각인 심볼별 시계열을 각자의 종가 범위로
//! min-max 정규화한 뒤, 한 번에 하나씩 꺼내 평균을 내는 단일 스트림으로
//! 합칩니다. 출력 길이는 가장 짧은 시계열에 맞춰집니다: 어느 한 시계열이
//! 소진되는 순간 스트림 전체가 종료됩니다.

use charts_core::PriceBar;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// 분석 오류.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    /// 정규화할 수 없는 구간 (종가의 min == max).
    ///
    /// 변동이 전혀 없는 시계열은 의미 있게 정규화할 수 없으므로
    /// 해당 비교 요청 전체를 실패시킵니다.
    #[error("정규화할 수 없는 구간: {symbol}의 종가가 {value}로 일정함")]
    DegenerateRange { symbol: String, value: f64 },
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// 자기 범위로 min-max 정규화된 단일 심볼 시계열.
///
/// 종가의 min/max는 생성 시 한 번만 계산되어 수명 동안 재사용됩니다.
#[derive(Debug)]
pub struct NormalizedSeries {
    symbol: String,
    points: Vec<(DateTime<Utc>, f64)>,
    min: f64,
    max: f64,
}

impl NormalizedSeries {
    /// 시간 순으로 정렬된 바 목록에서 정규화 시계열을 만듭니다.
    ///
    /// # Errors
    ///
    /// 비어 있지 않은 시계열의 종가가 전부 같으면
    /// `AnalyticsError::DegenerateRange`. 빈 시계열은 허용되며,
    /// 그 경우 결합된 스트림이 곧바로 종료됩니다.
    pub fn from_bars(symbol: impl Into<String>, bars: &[PriceBar]) -> Result<Self> {
        let symbol = symbol.into();
        let points: Vec<(DateTime<Utc>, f64)> =
            bars.iter().map(|b| (b.time(), b.price())).collect();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &(_, price) in &points {
            min = min.min(price);
            max = max.max(price);
        }

        if !points.is_empty() && min == max {
            return Err(AnalyticsError::DegenerateRange { symbol, value: min });
        }

        Ok(Self {
            symbol,
            points,
            min,
            max,
        })
    }

    /// 심볼 식별자.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 시계열 길이.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 시계열이 비어 있는지.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 종가 최솟값.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 종가 최댓값.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// 시계열의 (시작, 끝) 시각. 빈 시계열이면 `None`.
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.points.first()?.0, self.points.last()?.0))
    }

    /// 정규화된 (시각, 값) 포인트를 지연 생성합니다.
    ///
    /// 값은 `(price - min) / (max - min)`으로 항상 `[0, 1]` 범위입니다.
    pub fn normalized(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        let delta = self.max - self.min;
        self.points.iter().map(move |&(t, p)| (t, (p - self.min) / delta))
    }

    /// `i`번째 정규화 포인트. 범위 밖이면 `None`.
    fn normalized_at(&self, i: usize) -> Option<(DateTime<Utc>, f64)> {
        let &(t, p) = self.points.get(i)?;
        Some((t, (p - self.min) / (self.max - self.min)))
    }
}

/// N개 정규화 시계열의 lockstep 평균 이터레이터.
///
/// `next()` 호출마다 모든 시계열에서 원소를 하나씩 생성 순서대로 꺼내
/// 산술 평균을 내고, 어느 하나라도 소진되는 즉시 영구히 종료됩니다
/// (최단 시계열 기준 의미론). 포인트의 시각은 그 라운드에서 마지막으로
/// 꺼낸 원소의 시각입니다: 엄격한 동일-시각 조인이 아니라, 시계열들이
/// 버킷 시각을 공유한다고 가정하는 zip입니다.
pub struct AlignedAverage {
    series: Vec<NormalizedSeries>,
    cursor: usize,
    done: bool,
}

impl AlignedAverage {
    /// 정규화 시계열 목록에서 평균 스트림을 만듭니다.
    ///
    /// 시계열이 하나도 없으면 빈 스트림입니다.
    pub fn new(series: Vec<NormalizedSeries>) -> Self {
        let done = series.is_empty();
        Self {
            series,
            cursor: 0,
            done,
        }
    }
}

impl Iterator for AlignedAverage {
    type Item = (DateTime<Utc>, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut sum = 0.0;
        let mut point_time = None;
        for series in &self.series {
            match series.normalized_at(self.cursor) {
                Some((t, v)) => {
                    sum += v;
                    point_time = Some(t);
                }
                None => {
                    // 한 시계열이라도 소진되면 스트림 전체가 끝난다
                    self.done = true;
                    return None;
                }
            }
        }

        self.cursor += 1;
        Some((point_time?, sum / self.series.len() as f64))
    }
}
