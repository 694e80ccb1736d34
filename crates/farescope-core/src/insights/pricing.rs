use crate::summary::round2;
use crate::types::FlightRecord;
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

/// Routes listed in each of the expensive/cheapest rankings.
pub const RANKED_ROUTES: usize = 3;

/// Routes listed in the volatility ranking.
pub const VOLATILE_ROUTES: usize = 5;

/// Route fare rankings and the fare pattern across ISO weeks.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PriceInsights {
    /// Highest mean fare first.
    pub expensive_routes: Vec<RoutePrice>,
    /// Lowest mean fare first.
    pub cheapest_routes: Vec<RoutePrice>,
    /// Largest sample standard deviation first. Routes with a single
    /// flight have no deviation and are left out.
    pub price_volatility: Vec<RouteVolatility>,
    /// Chronological.
    pub weekly_price_pattern: Vec<WeeklyPrice>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoutePrice {
    pub route: String,
    pub mean_price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteVolatility {
    pub route: String,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklyPrice {
    pub year: i32,
    pub week: u32,
    pub mean_price: f64,
    pub flights: usize,
}

pub fn price_insights(records: &[FlightRecord]) -> PriceInsights {
    if records.is_empty() {
        return PriceInsights::default();
    }

    let mut by_route: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut by_week: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for r in records {
        by_route.entry(r.route.as_str()).or_default().push(r.price);
        let week = r.departure_date.iso_week();
        let e = by_week.entry((week.year(), week.week())).or_insert((0.0, 0));
        e.0 += r.price;
        e.1 += 1;
    }

    // Route-label order, so stable sorts break ties alphabetically.
    let means: Vec<RoutePrice> = by_route
        .iter()
        .map(|(route, prices)| RoutePrice {
            route: route.to_string(),
            mean_price: round2(mean(prices)),
        })
        .collect();

    let mut expensive_routes = means.clone();
    expensive_routes.sort_by(|a, b| b.mean_price.total_cmp(&a.mean_price));
    expensive_routes.truncate(RANKED_ROUTES);

    let mut cheapest_routes = means;
    cheapest_routes.sort_by(|a, b| a.mean_price.total_cmp(&b.mean_price));
    cheapest_routes.truncate(RANKED_ROUTES);

    let mut price_volatility: Vec<RouteVolatility> = by_route
        .iter()
        .filter(|(_, prices)| prices.len() > 1)
        .map(|(route, prices)| RouteVolatility {
            route: route.to_string(),
            std_dev: round2(sample_std_dev(prices)),
        })
        .collect();
    price_volatility.sort_by(|a, b| b.std_dev.total_cmp(&a.std_dev));
    price_volatility.truncate(VOLATILE_ROUTES);

    let weekly_price_pattern = by_week
        .into_iter()
        .map(|((year, week), (sum, flights))| WeeklyPrice {
            year,
            week,
            mean_price: round2(sum / flights as f64),
            flights,
        })
        .collect();

    PriceInsights {
        expensive_routes,
        cheapest_routes,
        price_volatility,
        weekly_price_pattern,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
