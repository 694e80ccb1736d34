use crate::error::{FarescopeError, Result};
use crate::summary::{round2, top_counts, RouteCount};
use crate::types::{FlightRecord, WEEKDAY_NAMES};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Routes kept in a route popularity chart.
pub const ROUTE_POPULARITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    PriceTrend,
    AirlineDistribution,
    RoutePopularity,
    DemandHeatmap,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [
        ChartType::PriceTrend,
        ChartType::AirlineDistribution,
        ChartType::RoutePopularity,
        ChartType::DemandHeatmap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::PriceTrend => "price_trend",
            ChartType::AirlineDistribution => "airline_distribution",
            ChartType::RoutePopularity => "route_popularity",
            ChartType::DemandHeatmap => "demand_heatmap",
        }
    }
}

impl FromStr for ChartType {
    type Err = FarescopeError;

    fn from_str(s: &str) -> Result<Self> {
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| FarescopeError::InvalidChartType(s.to_string()))
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alternative renderings of the demand heatmap, selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapView {
    /// Flights per day of week and hour.
    FlightCount,
    /// Mean fare per day of week and hour.
    PriceHeatmap,
    /// Mean demand score per day of week and hour.
    DemandScore,
    /// Flights per route and airline.
    RouteAirline,
    /// Mean fare per route and day of week.
    RouteDayPrice,
    /// Flights per weekday/weekend and hour.
    WeekendAnalysis,
}

impl HeatmapView {
    pub const ALL: [HeatmapView; 6] = [
        HeatmapView::FlightCount,
        HeatmapView::PriceHeatmap,
        HeatmapView::DemandScore,
        HeatmapView::RouteAirline,
        HeatmapView::RouteDayPrice,
        HeatmapView::WeekendAnalysis,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeatmapView::FlightCount => "flight_count",
            HeatmapView::PriceHeatmap => "price_heatmap",
            HeatmapView::DemandScore => "demand_score",
            HeatmapView::RouteAirline => "route_airline",
            HeatmapView::RouteDayPrice => "route_day_price",
            HeatmapView::WeekendAnalysis => "weekend_analysis",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            HeatmapView::FlightCount => "Flight Demand by Day and Hour",
            HeatmapView::PriceHeatmap => "Average Price by Day and Hour",
            HeatmapView::DemandScore => "Demand Score by Day and Hour",
            HeatmapView::RouteAirline => "Flights by Route and Airline",
            HeatmapView::RouteDayPrice => "Average Price by Route and Day of Week",
            HeatmapView::WeekendAnalysis => "Weekend vs Weekday Flights by Hour",
        }
    }
}

impl FromStr for HeatmapView {
    type Err = FarescopeError;

    /// `default` selects [`HeatmapView::FlightCount`].
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "default" {
            return Ok(HeatmapView::FlightCount);
        }
        HeatmapView::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| FarescopeError::Validation(format!("unknown heatmap view '{}'", s)))
    }
}

impl fmt::Display for HeatmapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub mean_price: f64,
    pub flights: usize,
}

/// Day-of-week by hour-of-day grids. Rows are Monday-first, columns are
/// hours 0 through 23.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Heatmap {
    pub day_labels: [&'static str; 7],
    pub hour_labels: Vec<u8>,
    pub counts: [[usize; 24]; 7],
    /// Mean fare per cell, 0.0 where no flights depart.
    pub mean_prices: [[f64; 24]; 7],
    /// Views selectable through [`build_heatmap_view`].
    pub heatmap_views: [HeatmapView; 6],
}

/// One heatmap view as labelled rows × columns.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HeatmapGrid {
    pub view: HeatmapView,
    pub title: &'static str,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// Zero where no flights fall in the cell.
    pub values: Vec<Vec<f64>>,
}

/// A selected heatmap view with the list of alternatives.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HeatmapViewChart {
    pub chart_type: ChartType,
    pub current_view: HeatmapView,
    pub heatmap_views: [HeatmapView; 6],
    pub chart: HeatmapGrid,
}

/// Serializable chart payload, tagged by `chart_type`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "chart_type", rename_all = "snake_case")]
pub enum ChartPayload {
    PriceTrend { points: Vec<PricePoint> },
    AirlineDistribution { counts: BTreeMap<String, usize> },
    RoutePopularity { routes: Vec<RouteCount> },
    DemandHeatmap(Heatmap),
}

impl ChartPayload {
    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartPayload::PriceTrend { .. } => ChartType::PriceTrend,
            ChartPayload::AirlineDistribution { .. } => ChartType::AirlineDistribution,
            ChartPayload::RoutePopularity { .. } => ChartType::RoutePopularity,
            ChartPayload::DemandHeatmap(_) => ChartType::DemandHeatmap,
        }
    }
}

/// All four charts for one table, as returned alongside a fetch.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSet {
    pub price_trend: ChartPayload,
    pub airline_distribution: ChartPayload,
    pub route_popularity: ChartPayload,
    pub demand_heatmap: ChartPayload,
}

pub fn build_chart(chart_type: ChartType, records: &[FlightRecord]) -> ChartPayload {
    match chart_type {
        ChartType::PriceTrend => ChartPayload::PriceTrend {
            points: price_trend(records),
        },
        ChartType::AirlineDistribution => ChartPayload::AirlineDistribution {
            counts: airline_distribution(records),
        },
        ChartType::RoutePopularity => ChartPayload::RoutePopularity {
            routes: route_popularity(records),
        },
        ChartType::DemandHeatmap => ChartPayload::DemandHeatmap(demand_heatmap(records)),
    }
}

/// Parse `chart_type` and build it. Unknown names are `InvalidChartType`.
pub fn build_named_chart(chart_type: &str, records: &[FlightRecord]) -> Result<ChartPayload> {
    Ok(build_chart(chart_type.parse()?, records))
}

pub fn build_all(records: &[FlightRecord]) -> ChartSet {
    ChartSet {
        price_trend: build_chart(ChartType::PriceTrend, records),
        airline_distribution: build_chart(ChartType::AirlineDistribution, records),
        route_popularity: build_chart(ChartType::RoutePopularity, records),
        demand_heatmap: build_chart(ChartType::DemandHeatmap, records),
    }
}

/// Mean fare per departure date, date-ascending.
pub fn price_trend(records: &[FlightRecord]) -> Vec<PricePoint> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for r in records {
        let e = by_date.entry(r.departure_date).or_insert((0.0, 0));
        e.0 += r.price;
        e.1 += 1;
    }
    by_date
        .into_iter()
        .map(|(date, (sum, flights))| PricePoint {
            date,
            mean_price: round2(sum / flights as f64),
            flights,
        })
        .collect()
}

pub fn airline_distribution(records: &[FlightRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.airline.name().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Top routes by flight count, descending; ties ordered by label.
pub fn route_popularity(records: &[FlightRecord]) -> Vec<RouteCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.route.clone()).or_insert(0) += 1;
    }
    top_counts(counts, ROUTE_POPULARITY_LIMIT)
}

/// Always 7×24, zero-filled, whatever the input size.
pub fn demand_heatmap(records: &[FlightRecord]) -> Heatmap {
    let mut counts = [[0usize; 24]; 7];
    let mut sums = [[0f64; 24]; 7];
    for r in records {
        let day = r.weekday().num_days_from_monday() as usize;
        let hour = (r.hour as usize).min(23);
        counts[day][hour] += 1;
        sums[day][hour] += r.price;
    }

    let mut mean_prices = [[0f64; 24]; 7];
    for day in 0..7 {
        for hour in 0..24 {
            if counts[day][hour] > 0 {
                mean_prices[day][hour] = round2(sums[day][hour] / counts[day][hour] as f64);
            }
        }
    }

    Heatmap {
        day_labels: WEEKDAY_NAMES,
        hour_labels: (0..24).collect(),
        counts,
        mean_prices,
        heatmap_views: HeatmapView::ALL,
    }
}

pub fn build_heatmap_view(view: HeatmapView, records: &[FlightRecord]) -> HeatmapViewChart {
    HeatmapViewChart {
        chart_type: ChartType::DemandHeatmap,
        current_view: view,
        heatmap_views: HeatmapView::ALL,
        chart: heatmap_view(view, records),
    }
}

/// Day and hour views are always 7×24 and the weekend view 2×24. Route
/// and airline axes list the labels present in `records`, sorted.
pub fn heatmap_view(view: HeatmapView, records: &[FlightRecord]) -> HeatmapGrid {
    let day = |r: &FlightRecord| r.weekday().num_days_from_monday() as usize;
    let hour = |r: &FlightRecord| (r.hour as usize).min(23);
    let day_labels = || WEEKDAY_NAMES.iter().map(|d| d.to_string()).collect::<Vec<_>>();
    let hour_labels = || (0..24).map(|h: u8| h.to_string()).collect::<Vec<_>>();

    let (row_labels, column_labels, values) = match view {
        HeatmapView::FlightCount | HeatmapView::PriceHeatmap | HeatmapView::DemandScore => {
            let mut cells = Cells::new(7, 24);
            for r in records {
                let value = match view {
                    HeatmapView::DemandScore => r.demand_score,
                    _ => r.price,
                };
                cells.add(day(r), hour(r), value);
            }
            let values = match view {
                HeatmapView::FlightCount => cells.counts(),
                _ => cells.means(),
            };
            (day_labels(), hour_labels(), values)
        }
        HeatmapView::RouteAirline => {
            let routes = axis(records.iter().map(|r| r.route.as_str()));
            let airlines = axis(records.iter().map(|r| r.airline.name()));
            let mut cells = Cells::new(routes.len(), airlines.len());
            for r in records {
                cells.add(routes[r.route.as_str()], airlines[r.airline.name()], r.price);
            }
            (labels(&routes), labels(&airlines), cells.counts())
        }
        HeatmapView::RouteDayPrice => {
            let routes = axis(records.iter().map(|r| r.route.as_str()));
            let mut cells = Cells::new(routes.len(), 7);
            for r in records {
                cells.add(routes[r.route.as_str()], day(r), r.price);
            }
            (labels(&routes), day_labels(), cells.means())
        }
        HeatmapView::WeekendAnalysis => {
            let mut cells = Cells::new(2, 24);
            for r in records {
                cells.add(usize::from(r.is_weekend), hour(r), r.price);
            }
            let rows = vec!["Weekday".to_string(), "Weekend".to_string()];
            (rows, hour_labels(), cells.counts())
        }
    };

    HeatmapGrid {
        view,
        title: view.title(),
        row_labels,
        column_labels,
        values,
    }
}

/// Sorted distinct labels mapped to their row or column index.
fn axis<'a>(names: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, usize> {
    names
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect()
}

fn labels(axis: &BTreeMap<&str, usize>) -> Vec<String> {
    axis.keys().map(|k| k.to_string()).collect()
}

struct Cells {
    sums: Vec<Vec<f64>>,
    counts: Vec<Vec<usize>>,
}

impl Cells {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            sums: vec![vec![0.0; columns]; rows],
            counts: vec![vec![0; columns]; rows],
        }
    }

    fn add(&mut self, row: usize, column: usize, value: f64) {
        self.sums[row][column] += value;
        self.counts[row][column] += 1;
    }

    fn counts(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| row.iter().map(|c| *c as f64).collect())
            .collect()
    }

    fn means(&self) -> Vec<Vec<f64>> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(sums, counts)| {
                sums.iter()
                    .zip(counts)
                    .map(|(sum, n)| if *n > 0 { round2(sum / *n as f64) } else { 0.0 })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Airline;
    use proptest::prelude::*;

    fn flight(origin: &str, destination: &str, date: &str, hour: u32, price: f64) -> FlightRecord {
        let departure = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap();
        FlightRecord::new(Airline::VirginAustralia, "VA800", origin, destination, departure, price, 95)
    }

    #[test]
    fn parses_known_chart_types() {
        for t in ChartType::ALL {
            assert_eq!(t.as_str().parse::<ChartType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_chart_type_is_rejected() {
        let err = build_named_chart("bogus", &[]).unwrap_err();
        assert!(matches!(err, FarescopeError::InvalidChartType(ref s) if s == "bogus"));
    }

    #[test]
    fn price_trend_is_sorted_by_date() {
        let records = vec![
            flight("SYD", "MEL", "2025-07-21", 9, 100.0),
            flight("SYD", "MEL", "2025-07-19", 9, 150.0),
            flight("SYD", "MEL", "2025-07-19", 12, 250.0),
        ];
        let points = price_trend(&records);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date.to_string(), "2025-07-19");
        assert_eq!(points[0].mean_price, 200.0);
        assert_eq!(points[0].flights, 2);
        assert_eq!(points[1].mean_price, 100.0);
    }

    #[test]
    fn route_popularity_limits_and_orders() {
        let mut records = Vec::new();
        let airports = ["SYD", "MEL", "BNE", "PER", "ADL", "CBR"];
        for (i, o) in airports.iter().enumerate() {
            for (j, d) in airports.iter().enumerate() {
                if o != d {
                    for _ in 0..(1 + (i + j) % 3) {
                        records.push(flight(o, d, "2025-07-19", 10, 120.0));
                    }
                }
            }
        }
        let routes = route_popularity(&records);
        assert_eq!(routes.len(), ROUTE_POPULARITY_LIMIT);
        for pair in routes.windows(2) {
            assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].route < pair[1].route)
            );
        }
    }

    #[test]
    fn heatmap_places_counts_and_means() {
        // 2025-07-19 is a Saturday
        let records = vec![
            flight("SYD", "MEL", "2025-07-19", 7, 100.0),
            flight("SYD", "MEL", "2025-07-19", 7, 200.0),
        ];
        let h = demand_heatmap(&records);
        assert_eq!(h.counts[5][7], 2);
        assert_eq!(h.mean_prices[5][7], 150.0);
        assert_eq!(h.counts.iter().flatten().sum::<usize>(), 2);
        assert_eq!(h.hour_labels.len(), 24);
    }

    #[test]
    fn empty_heatmap_is_all_zeros() {
        let h = demand_heatmap(&[]);
        assert_eq!(h.counts.len(), 7);
        assert!(h.counts.iter().all(|row| row.len() == 24 && row.iter().all(|c| *c == 0)));
    }

    #[test]
    fn payload_serializes_with_type_tag() {
        let payload = build_chart(ChartType::AirlineDistribution, &[flight("SYD", "MEL", "2025-07-19", 7, 100.0)]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["chart_type"], "airline_distribution");
        assert_eq!(json["counts"]["Virgin Australia"], 1);

        let heatmap = serde_json::to_value(build_chart(ChartType::DemandHeatmap, &[])).unwrap();
        assert_eq!(heatmap["chart_type"], "demand_heatmap");
        assert_eq!(heatmap["counts"].as_array().unwrap().len(), 7);
        assert_eq!(heatmap["counts"][0].as_array().unwrap().len(), 24);
    }

    // ── Heatmap views ───────────────────────────────────────────────────────

    #[test]
    fn parses_heatmap_views() {
        for v in HeatmapView::ALL {
            assert_eq!(v.as_str().parse::<HeatmapView>().unwrap(), v);
        }
        assert_eq!("default".parse::<HeatmapView>().unwrap(), HeatmapView::FlightCount);
        let err = "contour".parse::<HeatmapView>().unwrap_err();
        assert!(matches!(err, FarescopeError::Validation(_)));
    }

    #[test]
    fn day_hour_views_are_seven_by_twenty_four() {
        for view in [HeatmapView::FlightCount, HeatmapView::PriceHeatmap, HeatmapView::DemandScore] {
            let grid = heatmap_view(view, &[]);
            assert_eq!(grid.row_labels.len(), 7);
            assert_eq!(grid.column_labels.len(), 24);
            assert_eq!(grid.values.len(), 7);
            assert!(grid.values.iter().all(|row| row.len() == 24 && row.iter().all(|v| *v == 0.0)));
        }
    }

    #[test]
    fn demand_score_view_averages_scores() {
        // 2025-07-21 is a Monday
        let records = vec![
            flight("SYD", "MEL", "2025-07-21", 8, 100.0),
            flight("SYD", "MEL", "2025-07-21", 8, 300.0),
        ];
        let expected = round2((records[0].demand_score + records[1].demand_score) / 2.0);
        let grid = heatmap_view(HeatmapView::DemandScore, &records);
        assert_eq!(grid.values[0][8], expected);
        assert_eq!(grid.title, "Demand Score by Day and Hour");
    }

    #[test]
    fn route_airline_view_counts_pairs() {
        let mut records = vec![
            flight("SYD", "MEL", "2025-07-21", 8, 100.0),
            flight("SYD", "MEL", "2025-07-21", 9, 100.0),
            flight("MEL", "BNE", "2025-07-21", 9, 100.0),
        ];
        records[2].airline = Airline::Jetstar;

        let grid = heatmap_view(HeatmapView::RouteAirline, &records);
        assert_eq!(grid.row_labels, vec!["MEL-BNE", "SYD-MEL"]);
        assert_eq!(grid.column_labels, vec!["Jetstar", "Virgin Australia"]);
        assert_eq!(grid.values, vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
    }

    #[test]
    fn route_day_price_view_averages_by_weekday() {
        // 2025-07-19 Saturday, 2025-07-26 Saturday, 2025-07-21 Monday
        let records = vec![
            flight("SYD", "MEL", "2025-07-19", 8, 100.0),
            flight("SYD", "MEL", "2025-07-26", 8, 200.0),
            flight("SYD", "MEL", "2025-07-21", 8, 90.0),
        ];
        let grid = heatmap_view(HeatmapView::RouteDayPrice, &records);
        assert_eq!(grid.row_labels, vec!["SYD-MEL"]);
        assert_eq!(grid.column_labels.len(), 7);
        assert_eq!(grid.values[0][5], 150.0);
        assert_eq!(grid.values[0][0], 90.0);
        assert_eq!(grid.values[0][1], 0.0);
    }

    #[test]
    fn weekend_view_splits_by_day_type() {
        let records = vec![
            flight("SYD", "MEL", "2025-07-19", 8, 100.0),
            flight("SYD", "MEL", "2025-07-20", 8, 100.0),
            flight("SYD", "MEL", "2025-07-21", 17, 100.0),
        ];
        let grid = heatmap_view(HeatmapView::WeekendAnalysis, &records);
        assert_eq!(grid.row_labels, vec!["Weekday", "Weekend"]);
        assert_eq!(grid.values[1][8], 2.0);
        assert_eq!(grid.values[0][17], 1.0);
        assert_eq!(grid.values.iter().flatten().sum::<f64>(), 3.0);
    }

    #[test]
    fn view_chart_lists_alternatives() {
        let chart = build_heatmap_view(HeatmapView::PriceHeatmap, &[]);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["chart_type"], "demand_heatmap");
        assert_eq!(json["current_view"], "price_heatmap");
        assert_eq!(json["heatmap_views"].as_array().unwrap().len(), 6);
        assert_eq!(json["chart"]["view"], "price_heatmap");
    }

    proptest! {
        #[test]
        fn route_popularity_never_exceeds_limit(pairs in proptest::collection::vec((0usize..8, 0usize..8), 0..300)) {
            let airports = ["SYD", "MEL", "BNE", "PER", "ADL", "CBR", "DRW", "HBA"];
            let records: Vec<_> = pairs
                .into_iter()
                .filter(|(o, d)| o != d)
                .map(|(o, d)| flight(airports[o], airports[d], "2025-08-01", 10, 99.0))
                .collect();
            let routes = route_popularity(&records);
            prop_assert!(routes.len() <= ROUTE_POPULARITY_LIMIT);
            for pair in routes.windows(2) {
                prop_assert!(pair[0].count >= pair[1].count);
            }
        }
    }
}
