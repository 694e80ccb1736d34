use crate::cli::InsightsArgs;
use crate::pipeline::Pipeline;
use anyhow::Result;
use farescope_core::{summarize, InsightReport};

pub async fn run(args: &InsightsArgs, pipeline: &Pipeline) -> Result<()> {
    let query = args.route.query()?;
    let outcome = pipeline.data.fetch(&query, None).await;
    let summary = summarize(&outcome.records);

    let report = if args.template {
        InsightReport::template(&summary)
    } else {
        pipeline.insights.report(&summary).await
    };

    let bundle = &report.bundle;
    println!(
        "Insights for {} ({} data, {} insights)\n",
        query.route_label(),
        outcome.source,
        report.source
    );
    println!("Market trends\n  {}\n", bundle.market_trends);
    println!("Pricing\n  {}\n", bundle.pricing_analysis);
    println!("Demand\n  {}\n", bundle.demand_analysis);
    for (title, items) in [
        ("Recommendations", &bundle.recommendations),
        ("Risk factors", &bundle.risk_factors),
        ("Opportunities", &bundle.opportunities),
    ] {
        println!("{}", title);
        for (i, item) in items.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
        println!();
    }
    Ok(())
}

