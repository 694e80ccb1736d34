use super::{InsightBundle, SECTION_ITEMS};
use crate::error::{FarescopeError, Result};
use crate::summary::RouteSummary;
use std::fmt::Write;

pub const SYSTEM_PROMPT: &str = "You are an airline market analyst. \
Reply with a single JSON object and nothing else.";

/// User prompt embedding the summary statistics and the exact reply schema.
pub fn build_prompt(summary: &RouteSummary) -> String {
    let mut out = String::from("Analyze this airline booking market data and provide business insights.\n\nData Summary:\n");

    let _ = writeln!(out, "- Total flights: {}", summary.total_flights);
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        let _ = writeln!(out, "- Date range: {} to {}", first, last);
    }
    if let (Some(min), Some(mean), Some(max)) =
        (summary.min_price, summary.mean_price, summary.max_price)
    {
        let _ = writeln!(out, "- Average price: ${:.0}", mean);
        let _ = writeln!(out, "- Price range: ${:.0} - ${:.0}", min, max);
    }
    if let (Some(cheap), Some(dear)) = (summary.cheapest_date, summary.most_expensive_date) {
        let _ = writeln!(out, "- Cheapest date: {}, most expensive date: {}", cheap, dear);
    }
    if !summary.top_routes.is_empty() {
        let routes: Vec<String> = summary
            .top_routes
            .iter()
            .take(3)
            .map(|r| format!("{} ({})", r.route, r.count))
            .collect();
        let _ = writeln!(out, "- Popular routes: {}", routes.join(", "));
    }
    if !summary.market_share.is_empty() {
        let mut shares: Vec<_> = summary.market_share.iter().collect();
        shares.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let airlines: Vec<String> = shares
            .iter()
            .take(3)
            .map(|(name, pct)| format!("{} ({:.1}%)", name, pct))
            .collect();
        let _ = writeln!(out, "- Popular airlines: {}", airlines.join(", "));
    }
    if let (Some(day), Some(hour)) = (&summary.busiest_day, summary.busiest_hour) {
        let _ = writeln!(out, "- Busiest day: {}, busiest hour: {:02}:00", day, hour);
    }
    let _ = writeln!(out, "- Weekend flights: {:.0}%", summary.weekend_ratio * 100.0);
    let _ = writeln!(
        out,
        "- Daily price trend: {}, daily volume trend: {}",
        summary.price_trend.as_str(),
        summary.volume_trend.as_str()
    );

    let _ = write!(
        out,
        "\nRespond with a JSON object with exactly these keys:\n\
         \"market_trends\" (string), \"pricing_analysis\" (string), \"demand_analysis\" (string), \
         \"recommendations\" (array of exactly {n} strings), \"risk_factors\" (array of exactly {n} strings), \
         \"opportunities\" (array of exactly {n} strings).",
        n = SECTION_ITEMS
    );
    out
}

/// Strict parse of a model reply into a bundle. The reply may be wrapped in
/// a Markdown code fence; anything else that does not match the schema is
/// `UpstreamUnavailable`.
pub fn parse_model_reply(reply: &str) -> Result<InsightBundle> {
    let body = strip_code_fence(reply);
    let bundle: InsightBundle = serde_json::from_str(body).map_err(|e| {
        FarescopeError::UpstreamUnavailable(format!("model reply is not a valid insight bundle: {}", e))
    })?;
    bundle.validate()?;
    Ok(bundle)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::RouteSummary;
    use serde_json::json;

    fn reply(items: usize) -> serde_json::Value {
        let list: Vec<String> = (0..items).map(|i| format!("Item {}", i + 1)).collect();
        json!({
            "market_trends": "Demand is recovering.",
            "pricing_analysis": "Fares are stable.",
            "demand_analysis": "Fridays are busy.",
            "recommendations": list,
            "risk_factors": list,
            "opportunities": list,
        })
    }

    #[test]
    fn accepts_well_formed_reply() {
        let bundle = parse_model_reply(&reply(8).to_string()).unwrap();
        assert_eq!(bundle.recommendations.len(), 8);
        assert_eq!(bundle.market_trends, "Demand is recovering.");
    }

    #[test]
    fn accepts_fenced_reply() {
        let fenced = format!("```json\n{}\n```", reply(8));
        assert!(parse_model_reply(&fenced).is_ok());
    }

    #[test]
    fn rejects_wrong_cardinality() {
        let err = parse_model_reply(&reply(7).to_string()).unwrap_err();
        assert!(matches!(err, FarescopeError::UpstreamUnavailable(_)));
    }

    #[test]
    fn rejects_unknown_and_missing_fields() {
        let mut extra = reply(8);
        extra["analysis"] = json!("free text");
        assert!(parse_model_reply(&extra.to_string()).is_err());

        let mut missing = reply(8);
        missing.as_object_mut().unwrap().remove("risk_factors");
        assert!(parse_model_reply(&missing.to_string()).is_err());
    }

    #[test]
    fn rejects_prose() {
        let err = parse_model_reply("The market looks healthy overall.").unwrap_err();
        assert!(matches!(err, FarescopeError::UpstreamUnavailable(_)));
    }

    #[test]
    fn prompt_embeds_statistics() {
        let summary = RouteSummary {
            total_flights: 42,
            min_price: Some(90.0),
            max_price: Some(410.0),
            mean_price: Some(205.5),
            ..Default::default()
        };
        let prompt = build_prompt(&summary);
        assert!(prompt.contains("Total flights: 42"));
        assert!(prompt.contains("Price range: $90 - $410"));
        assert!(prompt.contains("exactly 8 strings"));
    }
}
