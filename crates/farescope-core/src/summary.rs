use crate::types::{FlightRecord, WEEKDAY_NAMES};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of routes kept in [`RouteSummary::top_routes`].
pub const TOP_ROUTES: usize = 5;

/// Slope (per date) beyond which a daily series counts as moving.
const TREND_THRESHOLD: f64 = 0.1;

/// Aggregated view over a flight table. Recomputed per request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteSummary {
    pub total_flights: usize,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub mean_price: Option<f64>,
    pub price_std_dev: Option<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Date with the highest mean fare; ties go to the earliest date.
    pub most_expensive_date: Option<NaiveDate>,
    /// Date with the lowest mean fare; ties go to the earliest date.
    pub cheapest_date: Option<NaiveDate>,
    pub airline_counts: BTreeMap<String, usize>,
    /// Percentage of flights per airline, rounded to one decimal.
    pub market_share: BTreeMap<String, f64>,
    pub airline_mean_prices: BTreeMap<String, f64>,
    /// Monday-first.
    pub day_of_week_counts: [usize; 7],
    pub hour_counts: [usize; 24],
    pub busiest_day: Option<String>,
    pub busiest_hour: Option<u8>,
    pub weekend_flights: usize,
    pub weekday_flights: usize,
    /// Weekend share of all flights, 0.0 when empty.
    pub weekend_ratio: f64,
    pub top_routes: Vec<RouteCount>,
    pub price_bands: PriceBands,
    pub price_trend: Trend,
    pub volume_trend: Trend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteCount {
    pub route: String,
    pub count: usize,
}

/// Flights per fare band: budget under 300, economy 300 to 500, premium above.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBands {
    pub budget: usize,
    pub economy: usize,
    pub premium: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    #[default]
    InsufficientData,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient data",
        }
    }
}

impl RouteSummary {
    pub fn is_empty(&self) -> bool {
        self.total_flights == 0
    }

    /// Airline with the most flights; ties go to the alphabetically first.
    pub fn market_leader(&self) -> Option<(&str, f64)> {
        let (name, _) = max_by_count(self.airline_counts.iter().map(|(k, v)| (k.as_str(), *v)))?;
        Some((name, self.market_share.get(name).copied().unwrap_or(0.0)))
    }

    /// Airline with the lowest mean fare.
    pub fn best_value_airline(&self) -> Option<(&str, f64)> {
        self.airline_mean_prices
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, v)| (k.as_str(), *v))
    }

    pub fn quietest_hour(&self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        // Only hours that actually see departures.
        self.hour_counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .min_by_key(|(h, c)| (**c, *h))
            .map(|(h, _)| h as u8)
    }
}

/// Single-pass accumulator behind [`summarize`].
#[derive(Debug, Default)]
pub struct Aggregator {
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    sum_sq: f64,
    by_date: BTreeMap<NaiveDate, (f64, usize)>,
    by_airline: BTreeMap<String, (f64, usize)>,
    by_route: HashMap<String, usize>,
    days: [usize; 7],
    hours: [usize; 24],
    weekend: usize,
    bands: PriceBands,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &FlightRecord) {
        let price = record.price;
        self.count += 1;
        self.min = Some(self.min.map_or(price, |m| m.min(price)));
        self.max = Some(self.max.map_or(price, |m| m.max(price)));
        self.sum += price;
        self.sum_sq += price * price;

        let date = self.by_date.entry(record.departure_date).or_insert((0.0, 0));
        date.0 += price;
        date.1 += 1;

        let airline = self
            .by_airline
            .entry(record.airline.name().to_string())
            .or_insert((0.0, 0));
        airline.0 += price;
        airline.1 += 1;

        *self.by_route.entry(record.route.clone()).or_insert(0) += 1;

        self.days[record.weekday().num_days_from_monday() as usize] += 1;
        self.hours[(record.hour as usize).min(23)] += 1;
        if record.is_weekend {
            self.weekend += 1;
        }

        if price < 300.0 {
            self.bands.budget += 1;
        } else if price < 500.0 {
            self.bands.economy += 1;
        } else {
            self.bands.premium += 1;
        }
    }

    pub fn finish(self) -> RouteSummary {
        if self.count == 0 {
            return RouteSummary::default();
        }

        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = if self.count > 1 {
            ((self.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };

        let date_means: Vec<(NaiveDate, f64)> = self
            .by_date
            .iter()
            .map(|(d, (sum, c))| (*d, sum / *c as f64))
            .collect();
        // BTreeMap iteration is date-ascending, so strict comparisons keep
        // the earliest date on ties.
        let mut most_expensive: Option<(NaiveDate, f64)> = None;
        let mut cheapest: Option<(NaiveDate, f64)> = None;
        for &(date, avg) in &date_means {
            if most_expensive.map_or(true, |(_, best)| avg > best) {
                most_expensive = Some((date, avg));
            }
            if cheapest.map_or(true, |(_, best)| avg < best) {
                cheapest = Some((date, avg));
            }
        }

        let airline_counts: BTreeMap<String, usize> = self
            .by_airline
            .iter()
            .map(|(k, (_, c))| (k.clone(), *c))
            .collect();
        let market_share = airline_counts
            .iter()
            .map(|(k, c)| (k.clone(), round1(*c as f64 / n * 100.0)))
            .collect();
        let airline_mean_prices = self
            .by_airline
            .iter()
            .map(|(k, (sum, c))| (k.clone(), round2(sum / *c as f64)))
            .collect();

        let busiest_day = max_by_count(self.days.iter().enumerate().map(|(i, c)| (i, *c)))
            .map(|(i, _)| WEEKDAY_NAMES[i].to_string());
        let busiest_hour =
            max_by_count(self.hours.iter().enumerate().map(|(h, c)| (h, *c))).map(|(h, _)| h as u8);

        let daily_prices: Vec<f64> = date_means.iter().map(|(_, p)| *p).collect();
        let daily_volumes: Vec<f64> = self.by_date.values().map(|(_, c)| *c as f64).collect();

        let summary = RouteSummary {
            total_flights: self.count,
            min_price: self.min,
            max_price: self.max,
            // Rounding must not push the mean outside [min, max].
            mean_price: Some(round2(mean).clamp(
                self.min.unwrap_or(mean),
                self.max.unwrap_or(mean),
            )),
            price_std_dev: Some(round2(variance.sqrt())),
            first_date: self.by_date.keys().next().copied(),
            last_date: self.by_date.keys().next_back().copied(),
            most_expensive_date: most_expensive.map(|(d, _)| d),
            cheapest_date: cheapest.map(|(d, _)| d),
            airline_counts,
            market_share,
            airline_mean_prices,
            day_of_week_counts: self.days,
            hour_counts: self.hours,
            busiest_day,
            busiest_hour,
            weekend_flights: self.weekend,
            weekday_flights: self.count - self.weekend,
            weekend_ratio: self.weekend as f64 / n,
            top_routes: top_counts(self.by_route, TOP_ROUTES),
            price_bands: self.bands,
            price_trend: trend_of(&daily_prices),
            volume_trend: trend_of(&daily_volumes),
        };

        debug!(
            "Summarized {} flights across {} dates",
            summary.total_flights,
            self.by_date.len()
        );
        summary
    }
}

impl Extend<FlightRecord> for Aggregator {
    fn extend<I: IntoIterator<Item = FlightRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(&record);
        }
    }
}

impl<'a> Extend<&'a FlightRecord> for Aggregator {
    fn extend<I: IntoIterator<Item = &'a FlightRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Summarize a flight table. An empty table yields a zero-valued summary.
pub fn summarize(records: &[FlightRecord]) -> RouteSummary {
    let mut aggregator = Aggregator::new();
    aggregator.extend(records);
    aggregator.finish()
}

/// Route counts sorted by count descending, then label ascending.
pub fn top_counts(counts: HashMap<String, usize>, limit: usize) -> Vec<RouteCount> {
    let mut routes: Vec<RouteCount> = counts
        .into_iter()
        .map(|(route, count)| RouteCount { route, count })
        .collect();
    routes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route)));
    routes.truncate(limit);
    routes
}

/// Direction of a series from its least-squares slope.
pub fn trend_of(series: &[f64]) -> Trend {
    if series.len() < 2 {
        return Trend::InsufficientData;
    }
    let n = series.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = series.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    let slope = num / den;
    if slope > TREND_THRESHOLD {
        Trend::Increasing
    } else if slope < -TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Highest count wins; ties go to the first key. `None` when all are zero.
fn max_by_count<K>(items: impl Iterator<Item = (K, usize)>) -> Option<(K, usize)> {
    let mut best: Option<(K, usize)> = None;
    for (k, c) in items {
        if c > 0 && best.as_ref().map_or(true, |(_, b)| c > *b) {
            best = Some((k, c));
        }
    }
    best
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
