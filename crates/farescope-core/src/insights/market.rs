use serde::Serialize;

/// Standing description of the Australian domestic market, returned with
/// market analysis regardless of the data context.
#[derive(Debug, Clone, Serialize)]
pub struct MarketOverview {
    pub total_market_size: &'static str,
    pub major_players: &'static [&'static str],
    pub market_trends: &'static [&'static str],
    pub key_drivers: &'static [&'static str],
    pub segments: Segments,
    pub market_shares: &'static [(&'static str, &'static str)],
    pub demand_outlook: DemandOutlook,
}

#[derive(Debug, Clone, Serialize)]
pub struct Segments {
    pub full_service: &'static [&'static str],
    pub low_cost: &'static [&'static str],
    pub regional: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct DemandOutlook {
    pub short_term: &'static str,
    pub medium_term: &'static str,
    pub factors: &'static [&'static str],
}

pub fn market_overview() -> MarketOverview {
    MarketOverview {
        total_market_size: "Approximately 60 million domestic passengers annually",
        major_players: &["Qantas", "Virgin Australia", "Jetstar", "Rex"],
        market_trends: &[
            "Increasing low-cost carrier penetration",
            "Growing business travel demand",
            "Seasonal tourism patterns",
        ],
        key_drivers: &[
            "Economic growth",
            "Tourism recovery",
            "Business travel demand",
            "Fuel prices",
        ],
        segments: Segments {
            full_service: &["Qantas", "Virgin Australia"],
            low_cost: &["Jetstar", "Tigerair"],
            regional: &["Rex"],
        },
        market_shares: &[
            ("Qantas", "40%"),
            ("Virgin Australia", "25%"),
            ("Jetstar", "20%"),
            ("Others", "15%"),
        ],
        demand_outlook: DemandOutlook {
            short_term: "Moderate growth expected over the next six months",
            medium_term: "Continued growth as business travel rebounds",
            factors: &["Post-pandemic recovery", "Business travel rebound", "Tourism growth"],
        },
    }
}
