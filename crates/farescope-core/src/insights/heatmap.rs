use crate::summary::round2;
use crate::types::{FlightRecord, WEEKDAY_NAMES};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Route × airline combinations reported in [`HeatmapInsights`].
pub const TOP_COMBINATIONS: usize = 5;

/// Call-outs accompanying the demand heatmap. Days and hours only compete
/// when at least one flight departs in them.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HeatmapInsights {
    pub peak_hour: Option<u8>,
    pub peak_day: Option<String>,
    pub quietest_hour: Option<u8>,
    pub quietest_day: Option<String>,
    pub expensive_hour: Option<u8>,
    pub cheapest_hour: Option<u8>,
    pub expensive_day: Option<String>,
    pub cheapest_day: Option<String>,
    pub high_demand_hour: Option<u8>,
    pub avg_demand_score: Option<f64>,
    pub weekend: WeekendSplit,
    pub top_combinations: Vec<RouteAirlineCount>,
    pub total_routes: usize,
    pub total_airlines: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WeekendSplit {
    pub weekday_flights: usize,
    pub weekend_flights: usize,
    pub weekday_avg_price: Option<f64>,
    pub weekend_avg_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteAirlineCount {
    pub route: String,
    pub airline: String,
    pub flights: usize,
}

#[derive(Default, Clone, Copy)]
struct Cell {
    flights: usize,
    price_sum: f64,
    demand_sum: f64,
}

impl Cell {
    fn add(&mut self, r: &FlightRecord) {
        self.flights += 1;
        self.price_sum += r.price;
        self.demand_sum += r.demand_score;
    }

    fn mean_price(&self) -> f64 {
        self.price_sum / self.flights as f64
    }

    fn mean_demand(&self) -> f64 {
        self.demand_sum / self.flights as f64
    }
}

pub fn heatmap_insights(records: &[FlightRecord]) -> HeatmapInsights {
    if records.is_empty() {
        return HeatmapInsights::default();
    }

    let mut hours = [Cell::default(); 24];
    let mut days = [Cell::default(); 7];
    let mut weekday = Cell::default();
    let mut weekend = Cell::default();
    let mut combos: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut routes = BTreeSet::new();
    let mut airlines = BTreeSet::new();
    let mut demand_total = 0.0;

    for r in records {
        hours[(r.hour as usize).min(23)].add(r);
        days[r.weekday().num_days_from_monday() as usize].add(r);
        if r.is_weekend {
            weekend.add(r);
        } else {
            weekday.add(r);
        }
        *combos
            .entry((r.route.clone(), r.airline.name().to_string()))
            .or_insert(0) += 1;
        routes.insert(r.route.as_str());
        airlines.insert(r.airline.name());
        demand_total += r.demand_score;
    }

    let hour_label = |i: usize| i as u8;
    let day_label = |i: usize| WEEKDAY_NAMES[i].to_string();

    let mut top: Vec<RouteAirlineCount> = combos
        .into_iter()
        .map(|((route, airline), flights)| RouteAirlineCount { route, airline, flights })
        .collect();
    // Stable sort keeps the (route, airline) order on ties.
    top.sort_by(|a, b| b.flights.cmp(&a.flights));
    top.truncate(TOP_COMBINATIONS);

    HeatmapInsights {
        peak_hour: extreme(&hours, |c| c.flights as f64, true).map(hour_label),
        peak_day: extreme(&days, |c| c.flights as f64, true).map(day_label),
        quietest_hour: extreme(&hours, |c| c.flights as f64, false).map(hour_label),
        quietest_day: extreme(&days, |c| c.flights as f64, false).map(day_label),
        expensive_hour: extreme(&hours, Cell::mean_price, true).map(hour_label),
        cheapest_hour: extreme(&hours, Cell::mean_price, false).map(hour_label),
        expensive_day: extreme(&days, Cell::mean_price, true).map(day_label),
        cheapest_day: extreme(&days, Cell::mean_price, false).map(day_label),
        high_demand_hour: extreme(&hours, Cell::mean_demand, true).map(hour_label),
        avg_demand_score: Some(round2(demand_total / records.len() as f64)),
        weekend: WeekendSplit {
            weekday_flights: weekday.flights,
            weekend_flights: weekend.flights,
            weekday_avg_price: (weekday.flights > 0).then(|| round2(weekday.mean_price())),
            weekend_avg_price: (weekend.flights > 0).then(|| round2(weekend.mean_price())),
        },
        top_combinations: top,
        total_routes: routes.len(),
        total_airlines: airlines.len(),
    }
}

/// Index of the highest (or lowest) metric among non-empty cells; ties go
/// to the lowest index.
fn extreme(cells: &[Cell], metric: impl Fn(&Cell) -> f64, highest: bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, cell) in cells.iter().enumerate().filter(|(_, c)| c.flights > 0) {
        let value = metric(cell);
        let better = match best {
            None => true,
            Some((_, b)) if highest => value > b,
            Some((_, b)) => value < b,
        };
        if better {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}
