use crate::summary::round2;
use crate::types::FlightRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Airlines and departure hours listed per route.
pub const TOP_PER_ROUTE: usize = 3;

/// Per-route profile of a flight table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteInsight {
    pub total_flights: usize,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub top_airlines: Vec<AirlineCount>,
    pub peak_hours: Vec<HourCount>,
    pub weekend_ratio: f64,
    pub mean_demand_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AirlineCount {
    pub airline: String,
    pub flights: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HourCount {
    pub hour: u8,
    pub flights: usize,
}

struct RouteTotals {
    flights: usize,
    price_sum: f64,
    min: f64,
    max: f64,
    demand_sum: f64,
    weekend: usize,
    airlines: BTreeMap<String, usize>,
    hours: [usize; 24],
}

impl RouteTotals {
    fn new() -> Self {
        Self {
            flights: 0,
            price_sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            demand_sum: 0.0,
            weekend: 0,
            airlines: BTreeMap::new(),
            hours: [0; 24],
        }
    }

    fn add(&mut self, r: &FlightRecord) {
        self.flights += 1;
        self.price_sum += r.price;
        self.min = self.min.min(r.price);
        self.max = self.max.max(r.price);
        self.demand_sum += r.demand_score;
        if r.is_weekend {
            self.weekend += 1;
        }
        *self.airlines.entry(r.airline.name().to_string()).or_insert(0) += 1;
        self.hours[(r.hour as usize).min(23)] += 1;
    }

    fn finish(self) -> RouteInsight {
        let n = self.flights as f64;

        let mut top_airlines: Vec<AirlineCount> = self
            .airlines
            .into_iter()
            .map(|(airline, flights)| AirlineCount { airline, flights })
            .collect();
        top_airlines.sort_by(|a, b| b.flights.cmp(&a.flights));
        top_airlines.truncate(TOP_PER_ROUTE);

        let mut peak_hours: Vec<HourCount> = self
            .hours
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(h, c)| HourCount {
                hour: h as u8,
                flights: *c,
            })
            .collect();
        peak_hours.sort_by(|a, b| b.flights.cmp(&a.flights));
        peak_hours.truncate(TOP_PER_ROUTE);

        RouteInsight {
            total_flights: self.flights,
            mean_price: round2(self.price_sum / n),
            min_price: self.min,
            max_price: self.max,
            top_airlines,
            peak_hours,
            weekend_ratio: round2(self.weekend as f64 / n),
            mean_demand_score: round2(self.demand_sum / n),
        }
    }
}

/// One profile per route label present in `records`. Ties in the top
/// lists keep airline-name or hour order.
pub fn route_insights(records: &[FlightRecord]) -> BTreeMap<String, RouteInsight> {
    let mut routes: BTreeMap<String, RouteTotals> = BTreeMap::new();
    for r in records {
        routes
            .entry(r.route.clone())
            .or_insert_with(RouteTotals::new)
            .add(r);
    }
    routes
        .into_iter()
        .map(|(route, totals)| (route, totals.finish()))
        .collect()
}
