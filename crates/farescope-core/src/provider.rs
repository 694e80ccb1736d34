//! Flight-data provider payloads and their mapping into [`FlightRecord`]s.
//!
//! The provider reports schedules only. Fares are filled in from the
//! generator's price model so live and mock tables share one shape.

use crate::error::{FarescopeError, Result};
use crate::generator::{is_midpoint, MockGenerator};
use crate::query::RouteQuery;
use crate::types::{Airline, FlightRecord};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use log::debug;
use rand::Rng;
use serde::Deserialize;

/// Top-level `/flights` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightsResponse {
    #[serde(default)]
    pub data: Vec<ProviderFlight>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderFlight {
    #[serde(default)]
    pub flight: FlightIdent,
    #[serde(default)]
    pub airline: AirlineIdent,
    #[serde(default)]
    pub departure: Endpoint,
    #[serde(default)]
    pub arrival: Endpoint,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightIdent {
    pub iata: Option<String>,
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirlineIdent {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Endpoint {
    pub iata: Option<String>,
    /// RFC 3339 timestamp, e.g. `2025-07-19T06:00:00+00:00`.
    pub scheduled: Option<String>,
}

/// Map a provider response onto `query`.
///
/// Entries outside the route or date range, without a flight number or
/// without a parseable departure are dropped. An empty result is
/// `UpstreamUnavailable` so the caller falls back to generated data.
pub fn map_response<R: Rng + ?Sized>(
    response: &FlightsResponse,
    query: &RouteQuery,
    generator: &MockGenerator,
    rng: &mut R,
) -> Result<Vec<FlightRecord>> {
    let days = query.day_count();
    let mut records = Vec::new();

    for entry in &response.data {
        let Some(record) = map_entry(entry, query, generator, days, rng) else {
            continue;
        };
        records.push(record);
    }

    debug!(
        "Mapped {} of {} provider entries for {}",
        records.len(),
        response.data.len(),
        query.route_label()
    );

    if records.is_empty() {
        return Err(FarescopeError::UpstreamUnavailable(format!(
            "provider returned no usable flights for {}",
            query.route_label()
        )));
    }
    records.sort_by_key(|r| r.departure());
    Ok(records)
}

fn map_entry<R: Rng + ?Sized>(
    entry: &ProviderFlight,
    query: &RouteQuery,
    generator: &MockGenerator,
    days: usize,
    rng: &mut R,
) -> Option<FlightRecord> {
    let origin = entry.departure.iata.as_deref()?;
    let destination = entry.arrival.iata.as_deref()?;
    if !origin.eq_ignore_ascii_case(query.origin())
        || !destination.eq_ignore_ascii_case(query.destination())
    {
        return None;
    }

    let flight_number = entry
        .flight
        .iata
        .as_deref()
        .or(entry.flight.number.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())?;

    let departs = parse_scheduled(entry.departure.scheduled.as_deref()?)?;
    let departure = departs.naive_local();
    let date = departure.date();
    if !query.contains(date) {
        return None;
    }

    let index = (date - query.date_from()).num_days() as usize;
    let price = generator.fare(origin, destination, date, is_midpoint(index, days), rng);

    let duration = entry
        .arrival
        .scheduled
        .as_deref()
        .and_then(parse_scheduled)
        .map(|arrives| (arrives - departs).num_minutes())
        .filter(|minutes| *minutes > 0)
        .map(|minutes| minutes as u32)
        .unwrap_or_else(|| generator.duration(origin, destination, rng));

    let airline = Airline::from(entry.airline.name.clone().unwrap_or_default());

    Some(FlightRecord::new(
        airline,
        flight_number,
        origin,
        destination,
        departure,
        price,
        duration,
    ))
}

/// Scheduled times carry the airport's own offset. Durations are taken
/// between offset-aware instants; a timestamp without an offset is read
/// as UTC.
fn parse_scheduled(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .ok()
}
