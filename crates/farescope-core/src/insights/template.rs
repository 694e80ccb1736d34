use super::{InsightBundle, SECTION_ITEMS};
use crate::summary::RouteSummary;

const STRATEGIC_RECOMMENDATIONS: [&str; 3] = [
    "Strategic Pricing: implement dynamic pricing models that adjust rates based on demand patterns and competitor pricing.",
    "Capacity Management: optimize flight schedules to match demand peaks, especially during weekends and holiday periods.",
    "Customer Segmentation: develop targeted marketing strategies for business and leisure travellers.",
];

const STANDING_RISKS: [&str; 7] = [
    "Economic Downturn: a recession could reduce discretionary travel spending by 20-30%.",
    "Fuel Price Volatility: a 10% increase in fuel prices could cut profitability by 5-8%.",
    "Regulatory Changes: new safety or environmental rules could increase operating costs.",
    "Competitive Pressure: new entrants or aggressive pricing by rivals could erode market share.",
    "Climate Change: extreme weather events could disrupt schedules and raise operating costs.",
    "Labor Relations: industrial disputes could lead to cancellations and reputational damage.",
    "Cybersecurity Threats: data breaches could compromise customer information and trust.",
];

const STANDING_OPPORTUNITIES: [&str; 7] = [
    "Regional Expansion: regional routes with growing business and tourism demand remain under-served.",
    "Premium Services: demand for premium economy and business class continues to grow.",
    "Loyalty Programs: richer frequent flyer benefits increase retention and revenue.",
    "Ancillary Services: baggage, seat selection and in-flight sales add revenue per passenger.",
    "Corporate Partnerships: travel management companies and corporate accounts offer steady volume.",
    "International Connections: the domestic network can feed international services.",
    "Digital Services: personalized recommendations and seamless booking lift conversion.",
];

/// Deterministic bundle filled from `summary`. Always complete, with
/// [`SECTION_ITEMS`] entries per list, including for an empty summary.
pub fn template_bundle(summary: &RouteSummary) -> InsightBundle {
    let bundle = InsightBundle {
        market_trends: market_trends(summary),
        pricing_analysis: pricing_analysis(summary),
        demand_analysis: demand_analysis(summary),
        recommendations: recommendations(summary),
        risk_factors: risk_factors(summary),
        opportunities: opportunities(summary),
    };
    debug_assert!(bundle.validate().is_ok());
    bundle
}

fn market_trends(s: &RouteSummary) -> String {
    if s.is_empty() {
        return "No flight data was available for this period. Long-run domestic patterns apply: \
                steady recovery in passenger demand, strong school-holiday seasonality and intense \
                competition between full-service and low-cost carriers."
            .to_string();
    }

    let mut text = format!("{} flights analysed", s.total_flights);
    if let (Some(first), Some(last)) = (s.first_date, s.last_date) {
        text.push_str(&format!(" between {} and {}", first, last));
    }
    text.push('.');
    if let Some((leader, share)) = s.market_leader() {
        text.push_str(&format!(
            " {} leads with {:.1}% market share across {} carriers.",
            leader,
            share,
            s.airline_counts.len()
        ));
    }
    text.push_str(&format!(
        " Daily fares are {} and daily volumes are {}.",
        s.price_trend.as_str(),
        s.volume_trend.as_str()
    ));
    if let Some(top) = s.top_routes.first() {
        text.push_str(&format!(
            " The busiest route is {} with {} departures.",
            top.route, top.count
        ));
    }
    text
}

fn pricing_analysis(s: &RouteSummary) -> String {
    let (Some(min), Some(max), Some(mean)) = (s.min_price, s.max_price, s.mean_price) else {
        return "No fares were observed, so no price range or average can be reported. \
                Fetch route data to analyse pricing."
            .to_string();
    };

    let mut text = format!(
        "Fares range from ${:.0} to ${:.0} with an average of ${:.0}",
        min, max, mean
    );
    if let Some(std_dev) = s.price_std_dev {
        text.push_str(&format!(" (standard deviation ${:.0})", std_dev));
    }
    text.push('.');
    if let (Some(cheap), Some(dear)) = (s.cheapest_date, s.most_expensive_date) {
        text.push_str(&format!(
            " {} was the cheapest departure date and {} the most expensive.",
            cheap, dear
        ));
    }
    if let Some((airline, price)) = s.best_value_airline() {
        text.push_str(&format!(
            " {} offers the lowest average fare at ${:.0}.",
            airline, price
        ));
    }
    text.push_str(&format!(
        " Fare mix: {} budget, {} economy and {} premium.",
        s.price_bands.budget, s.price_bands.economy, s.price_bands.premium
    ));
    text
}

fn demand_analysis(s: &RouteSummary) -> String {
    if s.is_empty() {
        return "No departures were observed, so demand by day and hour cannot be assessed."
            .to_string();
    }

    let mut text = String::new();
    if let (Some(day), Some(hour)) = (&s.busiest_day, s.busiest_hour) {
        text.push_str(&format!(
            "{} is the busiest day and {:02}:00 the busiest departure hour. ",
            day, hour
        ));
    }
    text.push_str(&format!(
        "{:.1}% of flights depart on weekends ({} of {}).",
        s.weekend_ratio * 100.0,
        s.weekend_flights,
        s.total_flights
    ));
    if let Some(hour) = s.quietest_hour() {
        text.push_str(&format!(" The quietest departure hour is {:02}:00.", hour));
    }
    text
}

fn recommendations(s: &RouteSummary) -> Vec<String> {
    let mut items = Vec::with_capacity(SECTION_ITEMS);

    items.push(match s.cheapest_date {
        Some(date) => format!(
            "Book around {}: it had the lowest average fare in the period.",
            date
        ),
        None => "Fetch route data to identify the cheapest departure dates.".to_string(),
    });

    items.push(match s.best_value_airline() {
        Some((airline, price)) => format!(
            "Compare {} fares first: it averaged ${:.0}, the lowest of any carrier.",
            airline, price
        ),
        None => "Compare fares across Qantas, Virgin Australia and Jetstar before booking.".to_string(),
    });

    items.push(match s.busiest_hour {
        Some(hour) => format!(
            "Avoid {:02}:00 departures where possible; it is the most contested slot.",
            hour
        ),
        None => "Favour early-morning and late-evening departures, which are usually less contested.".to_string(),
    });

    let weekend_pct = s.weekend_ratio * 100.0;
    items.push(if s.weekend_ratio > 0.6 {
        format!(
            "Weekends carry {:.0}% of flights; shift travel to weekdays for lower fares and less competition.",
            weekend_pct
        )
    } else {
        format!(
            "Weekday travel remains good value: weekends carry only {:.0}% of flights.",
            weekend_pct
        )
    });

    items.push(match (s.mean_price, s.min_price) {
        (Some(mean), _) if mean > 400.0 => format!(
            "Average fares of ${:.0} are high; book off-peak hours or further in advance.",
            mean
        ),
        (Some(mean), Some(min)) => format!(
            "Average fares of ${:.0} are moderate; set fare alerts to catch dips toward ${:.0}.",
            mean, min
        ),
        _ => "Set fare alerts on the routes you fly most to catch price dips.".to_string(),
    });

    items.extend(STRATEGIC_RECOMMENDATIONS.iter().map(|item| item.to_string()));
    items
}

fn risk_factors(s: &RouteSummary) -> Vec<String> {
    let first = match (s.min_price, s.max_price, s.price_std_dev) {
        (Some(min), Some(max), Some(std_dev)) => format!(
            "Fare Volatility: fares swung between ${:.0} and ${:.0} (standard deviation ${:.0}), making budgets hard to plan.",
            min, max, std_dev
        ),
        _ => "Fare Volatility: dynamic pricing can move fares 20-30% between peak and off-peak periods.".to_string(),
    };
    std::iter::once(first)
        .chain(STANDING_RISKS.iter().map(|item| item.to_string()))
        .collect()
}

fn opportunities(s: &RouteSummary) -> Vec<String> {
    let first = match s.top_routes.first() {
        Some(top) => format!(
            "Route Focus: {} carries the highest demand with {} departures; added capacity there fills fastest.",
            top.route, top.count
        ),
        None => "Route Focus: concentrate capacity on the highest-demand trunk routes such as SYD-MEL.".to_string(),
    };
    std::iter::once(first)
        .chain(STANDING_OPPORTUNITIES.iter().map(|item| item.to_string()))
        .collect()
}
