use farescope_core::charts::heatmap_view;
use farescope_core::{
    build_chart, heatmap_insights, price_insights, route_insights, summarize, template_bundle,
    ChartPayload, ChartType, HeatmapView, MockGenerator, RouteQuery,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Farescope Basic Usage Example ===\n");

    // 1. Validate a route query
    println!("1. Building query...");
    let query = RouteQuery::parse("SYD", "MEL", "2025-07-14", "2025-07-27")?;
    println!(
        "   ✓ {} from {} to {} ({} days)\n",
        query.route_label(),
        query.date_from(),
        query.date_to(),
        query.day_count()
    );

    // 2. Generate a table
    println!("2. Generating flights...");
    let records = MockGenerator::default().generate(&query, Some(120));
    println!("   ✓ {} records\n", records.len());

    // 3. Summarize
    println!("3. Summary:");
    let summary = summarize(&records);
    if let (Some(min), Some(mean), Some(max)) =
        (summary.min_price, summary.mean_price, summary.max_price)
    {
        println!("   Fares: ${:.0} - ${:.0} (mean ${:.0})", min, max, mean);
    }
    if let Some((airline, share)) = summary.market_leader() {
        println!("   Market leader: {} ({:.1}%)", airline, share);
    }
    println!(
        "   Busiest day: {}",
        summary.busiest_day.as_deref().unwrap_or("-")
    );
    println!("   Price trend: {}\n", summary.price_trend.as_str());

    // 4. Charts
    println!("4. Price trend chart:");
    if let ChartPayload::PriceTrend { points } = build_chart(ChartType::PriceTrend, &records) {
        for p in points.iter().take(5) {
            println!("   {}  ${:>7.2}  ({} flights)", p.date, p.mean_price, p.flights);
        }
        println!("   ...\n");
    }

    // 5. Heatmap call-outs
    let hot = heatmap_insights(&records);
    println!("5. Heatmap:");
    println!("   Peak hour: {:?}, quietest hour: {:?}", hot.peak_hour, hot.quietest_hour);
    let weekend = heatmap_view(HeatmapView::WeekendAnalysis, &records);
    println!("   {}: {:?}\n", weekend.title, weekend.row_labels);

    for (route, profile) in route_insights(&records) {
        println!(
            "   {}: {} flights, ${:.2} mean, weekend ratio {:.2}",
            route, profile.total_flights, profile.mean_price, profile.weekend_ratio
        );
    }
    for week in price_insights(&records).weekly_price_pattern {
        println!("   {}-W{:02}: ${:.2}", week.year, week.week, week.mean_price);
    }
    println!();

    // 6. Templated insights
    println!("6. Recommendations:");
    for (i, item) in template_bundle(&summary).recommendations.iter().enumerate() {
        println!("   {}. {}", i + 1, item);
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
