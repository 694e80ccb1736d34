use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day names in Monday-first order. Index with `Weekday::num_days_from_monday`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize]
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Operating carriers. Live providers may report carriers outside the
/// generator's set; those are kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Airline {
    Qantas,
    VirginAustralia,
    Jetstar,
    Rex,
    Tigerair,
    Other(String),
}

impl Airline {
    /// The generator's carrier set, in descending market weight.
    pub const KNOWN: [Airline; 5] = [
        Airline::Qantas,
        Airline::VirginAustralia,
        Airline::Jetstar,
        Airline::Rex,
        Airline::Tigerair,
    ];

    pub fn name(&self) -> &str {
        match self {
            Airline::Qantas => "Qantas",
            Airline::VirginAustralia => "Virgin Australia",
            Airline::Jetstar => "Jetstar",
            Airline::Rex => "Rex",
            Airline::Tigerair => "Tigerair",
            Airline::Other(name) => name,
        }
    }

    /// Two-letter IATA designator. `XX` for carriers outside the known set.
    pub fn code(&self) -> &'static str {
        match self {
            Airline::Qantas => "QF",
            Airline::VirginAustralia => "VA",
            Airline::Jetstar => "JQ",
            Airline::Rex => "ZL",
            Airline::Tigerair => "TT",
            Airline::Other(_) => "XX",
        }
    }

    /// Relative share of synthesized departures.
    pub fn market_weight(&self) -> f64 {
        match self {
            Airline::Qantas => 0.40,
            Airline::VirginAustralia => 0.30,
            Airline::Jetstar => 0.20,
            Airline::Rex => 0.08,
            Airline::Tigerair => 0.02,
            Airline::Other(_) => 0.0,
        }
    }
}

impl From<String> for Airline {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "qantas" => Airline::Qantas,
            "virgin australia" => Airline::VirginAustralia,
            "jetstar" => Airline::Jetstar,
            "rex" | "regional express" => Airline::Rex,
            "tigerair" | "tigerair australia" => Airline::Tigerair,
            "" => Airline::Other("Unknown".to_string()),
            _ => Airline::Other(name.trim().to_string()),
        }
    }
}

impl From<Airline> for String {
    fn from(airline: Airline) -> Self {
        airline.name().to_string()
    }
}

impl fmt::Display for Airline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a table of flight records came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Mock,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Live => f.write_str("live"),
            DataSource::Mock => f.write_str("mock"),
        }
    }
}

/// A flight table tagged with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub source: DataSource,
    pub records: Vec<FlightRecord>,
}

/// One observed or synthesized flight offer.
///
/// `day_of_week`, `is_weekend`, `hour`, `route` and `demand_score` are
/// derived from the other fields and recomputed on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "FlightRecordWire")]
pub struct FlightRecord {
    pub airline: Airline,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub route: String,
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    /// Fare in AUD. Always > 0.
    pub price: f64,
    /// Block time in minutes. Always > 0.
    pub duration_minutes: u32,
    pub day_of_week: String,
    pub is_weekend: bool,
    pub hour: u8,
    pub seats_available: Option<u32>,
    pub total_seats: Option<u32>,
    pub aircraft: Option<String>,
    pub demand_score: f64,
}

impl FlightRecord {
    pub fn new(
        airline: Airline,
        flight_number: impl Into<String>,
        origin: &str,
        destination: &str,
        departure: NaiveDateTime,
        price: f64,
        duration_minutes: u32,
    ) -> Self {
        let origin = origin.to_ascii_uppercase();
        let destination = destination.to_ascii_uppercase();
        let date = departure.date();
        let hour = departure.hour() as u8;
        Self {
            airline,
            flight_number: flight_number.into(),
            route: route_label(&origin, &destination),
            origin,
            destination,
            departure_date: date,
            departure_time: departure.time(),
            price,
            duration_minutes,
            day_of_week: weekday_name(date.weekday()).to_string(),
            is_weekend: is_weekend(date.weekday()),
            hour,
            seats_available: None,
            total_seats: None,
            aircraft: None,
            demand_score: demand_score(date, hour, price),
        }
    }

    pub fn with_seats(mut self, available: u32, total: u32) -> Self {
        self.seats_available = Some(available);
        self.total_seats = Some(total);
        self
    }

    pub fn with_aircraft(mut self, aircraft: impl Into<String>) -> Self {
        self.aircraft = Some(aircraft.into());
        self
    }

    pub fn weekday(&self) -> Weekday {
        self.departure_date.weekday()
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.departure_date.and_time(self.departure_time)
    }
}

pub fn route_label(origin: &str, destination: &str) -> String {
    format!("{}-{}", origin, destination)
}

/// Relative attractiveness of a departure: weekends and commuter peaks
/// draw more travellers, expensive fares fewer.
pub fn demand_score(date: NaiveDate, hour: u8, price: f64) -> f64 {
    let weekend = if is_weekend(date.weekday()) { 1.3 } else { 1.0 };
    let time = match hour {
        7..=9 | 17..=19 => 1.4,
        10..=16 => 1.1,
        _ => 0.8,
    };
    let price_factor = (1.0 - (price - 200.0) / 1000.0).max(0.5);
    ((weekend * time * price_factor) * 100.0).round() / 100.0
}

/// Inbound shape for records posted back by clients. Derived fields are
/// ignored and recomputed.
#[derive(Deserialize)]
struct FlightRecordWire {
    airline: Airline,
    flight_number: String,
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    price: f64,
    duration_minutes: u32,
    #[serde(default)]
    seats_available: Option<u32>,
    #[serde(default)]
    total_seats: Option<u32>,
    #[serde(default)]
    aircraft: Option<String>,
}

impl TryFrom<FlightRecordWire> for FlightRecord {
    type Error = String;

    fn try_from(w: FlightRecordWire) -> Result<Self, Self::Error> {
        if !(w.price.is_finite() && w.price > 0.0) {
            return Err(format!("price must be positive, got {}", w.price));
        }
        if w.duration_minutes == 0 {
            return Err("duration_minutes must be positive".to_string());
        }
        if w.origin.eq_ignore_ascii_case(&w.destination) {
            return Err(format!("origin and destination are both {}", w.origin));
        }
        let mut record = FlightRecord::new(
            w.airline,
            w.flight_number,
            &w.origin,
            &w.destination,
            w.departure_date.and_time(w.departure_time),
            w.price,
            w.duration_minutes,
        );
        record.seats_available = w.seats_available;
        record.total_seats = w.total_seats;
        record.aircraft = w.aircraft;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departure(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    #[test]
    fn derived_fields_follow_departure() {
        // 2025-07-19 is a Saturday
        let r = FlightRecord::new(
            Airline::Qantas,
            "QF401",
            "syd",
            "mel",
            departure(2025, 7, 19, 8),
            199.0,
            85,
        );
        assert_eq!(r.route, "SYD-MEL");
        assert_eq!(r.day_of_week, "Saturday");
        assert!(r.is_weekend);
        assert_eq!(r.hour, 8);
        // 1.3 * 1.4 * 1.001
        assert_eq!(r.demand_score, 1.82);
    }

    #[test]
    fn airline_names_round_trip_through_strings() {
        assert_eq!(Airline::from("Virgin Australia".to_string()), Airline::VirginAustralia);
        assert_eq!(Airline::from("  jetstar ".to_string()), Airline::Jetstar);
        assert_eq!(
            Airline::from("Air New Zealand".to_string()),
            Airline::Other("Air New Zealand".to_string())
        );
        let json = serde_json::to_string(&Airline::VirginAustralia).unwrap();
        assert_eq!(json, "\"Virgin Australia\"");
    }

    #[test]
    fn deserialization_recomputes_derived_fields() {
        let json = r#"{
            "airline": "Rex",
            "flight_number": "ZL123",
            "origin": "SYD",
            "destination": "CBR",
            "departure_date": "2025-07-21",
            "departure_time": "18:30:00",
            "price": 150.0,
            "duration_minutes": 55,
            "day_of_week": "Sunday",
            "is_weekend": true
        }"#;
        let r: FlightRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.day_of_week, "Monday");
        assert!(!r.is_weekend);
        assert_eq!(r.hour, 18);
        assert_eq!(r.route, "SYD-CBR");
    }

    #[test]
    fn deserialization_rejects_broken_invariants() {
        let bad_price = r#"{"airline":"Rex","flight_number":"ZL1","origin":"SYD","destination":"CBR",
            "departure_date":"2025-07-21","departure_time":"06:00:00","price":0.0,"duration_minutes":55}"#;
        assert!(serde_json::from_str::<FlightRecord>(bad_price).is_err());

        let same_airport = r#"{"airline":"Rex","flight_number":"ZL1","origin":"SYD","destination":"syd",
            "departure_date":"2025-07-21","departure_time":"06:00:00","price":90.0,"duration_minutes":55}"#;
        assert!(serde_json::from_str::<FlightRecord>(same_airport).is_err());
    }
}
