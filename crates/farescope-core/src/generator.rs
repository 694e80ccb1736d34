//! Synthetic flight tables for routes with no live provider data.
//!
//! Prices follow a simple demand model: a distance-based base fare with
//! random variation, lifted on weekends and around the middle of the
//! requested range, then clamped to a realistic band.

use crate::error::{FarescopeError, Result};
use crate::query::RouteQuery;
use crate::reference::{self, AIRCRAFT_TYPES, DEFAULT_ROUTE_DISTANCE_KM};
use crate::types::{is_weekend, Airline, FlightRecord};
use chrono::{Datelike, NaiveDate, NaiveTime};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// AUD per kilometre before demand adjustments.
pub const FARE_PER_KM: f64 = 0.15;

/// Routes sampled for the multi-route market snapshot.
pub const MARKET_SAMPLE_ROUTES: [(&str, &str); 6] = [
    ("SYD", "MEL"),
    ("MEL", "SYD"),
    ("SYD", "BNE"),
    ("BNE", "SYD"),
    ("MEL", "BNE"),
    ("BNE", "MEL"),
];

pub const MARKET_SAMPLE_DAYS: usize = 30;

/// Configuration for the mock data generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Fewest departures synthesized per date. Default: 3.
    pub min_flights_per_day: usize,

    /// Most departures synthesized per date. Default: 8.
    pub max_flights_per_day: usize,

    /// Fare multiplier on Saturdays and Sundays. Default: 1.3.
    pub weekend_multiplier: f64,

    /// Fare multiplier on the central date(s) of the range. Default: 1.2.
    pub midpoint_multiplier: f64,

    /// Lower bound of the fare band in AUD. Default: 80.
    pub price_floor: f64,

    /// Upper bound of the fare band in AUD. Default: 600.
    pub price_ceiling: f64,

    /// First departure hour of the operating day. Default: 6.
    pub first_departure_hour: u32,

    /// Last departure hour of the operating day. Default: 22.
    pub last_departure_hour: u32,

    /// Maximum deviation from the nominal block time, in minutes. Default: 15.
    pub duration_jitter_minutes: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_flights_per_day: 3,
            max_flights_per_day: 8,
            weekend_multiplier: 1.3,
            midpoint_multiplier: 1.2,
            price_floor: 80.0,
            price_ceiling: 600.0,
            first_departure_hour: 6,
            last_departure_hour: 22,
            duration_jitter_minutes: 15,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flights_per_day(mut self, min: usize, max: usize) -> Self {
        self.min_flights_per_day = min;
        self.max_flights_per_day = max;
        self
    }

    pub fn with_weekend_multiplier(mut self, multiplier: f64) -> Self {
        self.weekend_multiplier = multiplier;
        self
    }

    pub fn with_midpoint_multiplier(mut self, multiplier: f64) -> Self {
        self.midpoint_multiplier = multiplier;
        self
    }

    pub fn with_price_band(mut self, floor: f64, ceiling: f64) -> Self {
        self.price_floor = floor;
        self.price_ceiling = ceiling;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_flights_per_day == 0 {
            return Err(FarescopeError::Validation(
                "min_flights_per_day must be > 0".into(),
            ));
        }
        if self.min_flights_per_day > self.max_flights_per_day {
            return Err(FarescopeError::Validation(
                "min_flights_per_day must be <= max_flights_per_day".into(),
            ));
        }
        if !(self.price_floor > 0.0 && self.price_floor < self.price_ceiling) {
            return Err(FarescopeError::Validation(
                "price band must satisfy 0 < price_floor < price_ceiling".into(),
            ));
        }
        if self.weekend_multiplier < 1.0 || self.midpoint_multiplier < 1.0 {
            return Err(FarescopeError::Validation(
                "demand multipliers must be >= 1.0".into(),
            ));
        }
        if self.first_departure_hour > self.last_departure_hour || self.last_departure_hour > 23 {
            return Err(FarescopeError::Validation(
                "departure window must lie within 0..=23 and be non-empty".into(),
            ));
        }
        Ok(())
    }
}

/// Produces plausible flight records for a route and date range.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    config: GeneratorConfig,
}

impl MockGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a table for `query`, optionally aiming for `rows` records in
    /// total. Every date in the range receives at least one record.
    pub fn generate(&self, query: &RouteQuery, rows: Option<usize>) -> Vec<FlightRecord> {
        self.generate_with_rng(query, rows, &mut rand::thread_rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        query: &RouteQuery,
        rows: Option<usize>,
        rng: &mut R,
    ) -> Vec<FlightRecord> {
        self.generate_between(
            query.origin(),
            query.destination(),
            query.date_from(),
            query.date_to(),
            rows,
            rng,
        )
    }

    /// Unvalidated form of [`MockGenerator::generate_with_rng`]. A reversed
    /// range is a zero-length range and yields no records.
    pub fn generate_between<R: Rng + ?Sized>(
        &self,
        origin: &str,
        destination: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        rows: Option<usize>,
        rng: &mut R,
    ) -> Vec<FlightRecord> {
        if date_from > date_to {
            return Vec::new();
        }

        let days = ((date_to - date_from).num_days() + 1) as usize;
        let mut records = Vec::new();

        for (i, date) in date_from.iter_days().take(days).enumerate() {
            let count = match rows {
                Some(target) => {
                    let extra = usize::from(i < target % days);
                    (target / days + extra).max(1)
                }
                None => rng.gen_range(
                    self.config.min_flights_per_day..=self.config.max_flights_per_day,
                ),
            };

            let peak = is_midpoint(i, days);
            for _ in 0..count {
                records.push(self.synthesize(origin, destination, date, peak, rng));
            }
        }

        debug!(
            "Generated {} mock records for {}-{} over {} days",
            records.len(),
            origin,
            destination,
            days
        );
        records
    }

    /// Thirty days of traffic over the six busiest east-coast routes,
    /// starting at `start`. Used when a request carries no data context.
    pub fn market_sample<R: Rng + ?Sized>(&self, start: NaiveDate, rng: &mut R) -> Vec<FlightRecord> {
        let mut records = Vec::new();
        for (i, date) in start.iter_days().take(MARKET_SAMPLE_DAYS).enumerate() {
            let peak = is_midpoint(i, MARKET_SAMPLE_DAYS);
            for _ in 0..rng.gen_range(5..=10) {
                let (origin, destination) = *MARKET_SAMPLE_ROUTES
                    .choose(rng)
                    .unwrap_or(&MARKET_SAMPLE_ROUTES[0]);
                records.push(self.synthesize(origin, destination, date, peak, rng));
            }
        }
        records
    }

    /// Fare for one departure on `date`, before rounding. `peak` marks the
    /// central date(s) of the requested range.
    pub fn fare<R: Rng + ?Sized>(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        peak: bool,
        rng: &mut R,
    ) -> f64 {
        let distance = reference::route_distance_km(origin, destination)
            .unwrap_or(DEFAULT_ROUTE_DISTANCE_KM);
        let mut price = distance as f64 * FARE_PER_KM * rng.gen_range(0.7..1.5);
        if is_weekend(date.weekday()) {
            price *= self.config.weekend_multiplier;
        }
        if peak {
            price *= self.config.midpoint_multiplier;
        }
        let clamped = price.clamp(self.config.price_floor, self.config.price_ceiling);
        (clamped * 100.0).round() / 100.0
    }

    /// Nominal block time plus jitter. Never below 30 minutes.
    pub fn duration<R: Rng + ?Sized>(&self, origin: &str, destination: &str, rng: &mut R) -> u32 {
        let nominal = nominal_duration_minutes(origin, destination) as i64;
        let jitter = self.config.duration_jitter_minutes as i64;
        let minutes = nominal + rng.gen_range(-jitter..=jitter);
        minutes.max(30) as u32
    }

    fn synthesize<R: Rng + ?Sized>(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        peak: bool,
        rng: &mut R,
    ) -> FlightRecord {
        let hour = rng.gen_range(self.config.first_departure_hour..=self.config.last_departure_hour);
        let minute = *[0u32, 15, 30, 45].choose(rng).unwrap_or(&0);
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);

        let airline = Airline::KNOWN
            .choose_weighted(rng, |a| a.market_weight())
            .cloned()
            .unwrap_or(Airline::Qantas);
        let flight_number = format!("{}{}", airline.code(), rng.gen_range(100..=9999));

        let price = self.fare(origin, destination, date, peak, rng);
        let duration = self.duration(origin, destination, rng);

        let total_seats = rng.gen_range(150..=300);
        let available = rng.gen_range(10..=total_seats);
        let aircraft = *AIRCRAFT_TYPES.choose(rng).unwrap_or(&AIRCRAFT_TYPES[0]);

        FlightRecord::new(
            airline,
            flight_number,
            origin,
            destination,
            date.and_time(time),
            price,
            duration,
        )
        .with_seats(available, total_seats)
        .with_aircraft(aircraft)
    }
}

/// 30 minutes of taxi/climb/descent plus cruise at 800 km/h.
pub fn nominal_duration_minutes(origin: &str, destination: &str) -> u32 {
    let distance = reference::route_distance_km(origin, destination)
        .unwrap_or(DEFAULT_ROUTE_DISTANCE_KM);
    30 + (distance as f64 / 800.0 * 60.0).round() as u32
}

/// Whether date index `i` of a `days`-long range is a central date.
/// Odd-length ranges have one, even-length ranges two.
pub fn is_midpoint(i: usize, days: usize) -> bool {
    if days == 0 {
        return false;
    }
    let span = (days - 1) as i64;
    (2 * i as i64 - span).abs() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn query(from: &str, to: &str) -> RouteQuery {
        RouteQuery::parse("SYD", "MEL", from, to).unwrap()
    }

    #[test]
    fn covers_each_date_with_records_in_range() {
        let generator = MockGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let q = query("2025-07-19", "2025-07-21");
        let records = generator.generate_with_rng(&q, None, &mut rng);

        let dates: BTreeSet<_> = records.iter().map(|r| r.departure_date).collect();
        assert_eq!(dates.len(), 3);
        assert!(records.len() >= 9 && records.len() <= 24);

        for r in &records {
            assert!(q.contains(r.departure_date));
            assert!(r.price >= 80.0 && r.price <= 600.0);
            assert!(r.duration_minutes >= 30);
            assert!(r.hour >= 6 && r.hour <= 22);
            assert_eq!(r.route, "SYD-MEL");
            assert!(r.seats_available.unwrap() <= r.total_seats.unwrap());
        }
    }

    #[test]
    fn row_target_is_spread_across_dates() {
        let generator = MockGenerator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let q = query("2025-07-01", "2025-07-04");
        let records = generator.generate_with_rng(&q, Some(10), &mut rng);
        assert_eq!(records.len(), 10);

        let first_day = records
            .iter()
            .filter(|r| r.departure_date == date("2025-07-01"))
            .count();
        let last_day = records
            .iter()
            .filter(|r| r.departure_date == date("2025-07-04"))
            .count();
        assert_eq!(first_day, 3);
        assert_eq!(last_day, 2);
    }

    #[test]
    fn small_row_target_still_covers_every_date() {
        let generator = MockGenerator::default();
        let mut rng = StdRng::seed_from_u64(2);
        let q = query("2025-07-01", "2025-07-05");
        let records = generator.generate_with_rng(&q, Some(1), &mut rng);
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn reversed_range_yields_nothing() {
        let generator = MockGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let records = generator.generate_between(
            "SYD",
            "MEL",
            date("2025-07-21"),
            date("2025-07-19"),
            None,
            &mut rng,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn midpoint_dates() {
        assert!(is_midpoint(0, 1));
        assert!(!is_midpoint(0, 3));
        assert!(is_midpoint(1, 3));
        assert!(is_midpoint(1, 4));
        assert!(is_midpoint(2, 4));
        assert!(!is_midpoint(3, 4));
        assert!(!is_midpoint(0, 0));
    }

    #[test]
    fn weekend_fares_are_lifted() {
        // Long route so neither fare hits the clamp.
        let generator = MockGenerator::new(GeneratorConfig::new().with_price_band(1.0, 10_000.0));
        let saturday = date("2025-07-19");
        let tuesday = date("2025-07-22");
        let weekend = generator.fare("SYD", "PER", saturday, false, &mut StdRng::seed_from_u64(9));
        let weekday = generator.fare("SYD", "PER", tuesday, false, &mut StdRng::seed_from_u64(9));
        assert!((weekend / weekday - 1.3).abs() < 0.01);
    }

    #[test]
    fn market_sample_spans_thirty_days_and_several_routes() {
        let generator = MockGenerator::default();
        let mut rng = StdRng::seed_from_u64(11);
        let records = generator.market_sample(date("2025-07-01"), &mut rng);
        let dates: BTreeSet<_> = records.iter().map(|r| r.departure_date).collect();
        let routes: BTreeSet<_> = records.iter().map(|r| r.route.clone()).collect();
        assert_eq!(dates.len(), MARKET_SAMPLE_DAYS);
        assert!(routes.len() > 1);
        assert!(records.len() >= 150 && records.len() <= 300);
    }

    #[test]
    fn config_validation() {
        assert!(GeneratorConfig::default().validate().is_ok());
        assert!(GeneratorConfig::new().with_flights_per_day(0, 3).validate().is_err());
        assert!(GeneratorConfig::new().with_flights_per_day(5, 3).validate().is_err());
        assert!(GeneratorConfig::new().with_price_band(600.0, 80.0).validate().is_err());
        assert!(GeneratorConfig::new().with_weekend_multiplier(0.5).validate().is_err());
    }

    proptest! {
        #[test]
        fn every_date_gets_a_record(seed in any::<u64>(), start in 0i64..700, len in 0i64..60, rows in proptest::option::of(0usize..200)) {
            let from = date("2025-01-01") + chrono::Duration::days(start);
            let to = from + chrono::Duration::days(len);
            let q = RouteQuery::new("BNE", "PER", from, to).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let records = MockGenerator::default().generate_with_rng(&q, rows, &mut rng);

            let dates: BTreeSet<_> = records.iter().map(|r| r.departure_date).collect();
            prop_assert_eq!(dates.len(), q.day_count());
            for r in &records {
                prop_assert!(r.price > 0.0);
                prop_assert!(r.duration_minutes > 0);
                prop_assert!(q.contains(r.departure_date));
            }
        }
    }
}
