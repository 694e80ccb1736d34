use crate::cli::ChartArgs;
use crate::pipeline::Pipeline;
use anyhow::Result;
use farescope_core::{build_chart, build_heatmap_view, ChartType, HeatmapView};

pub async fn run(args: &ChartArgs, pipeline: &Pipeline) -> Result<()> {
    // Reject an unknown chart or view before fetching anything.
    let chart_type: ChartType = args.chart_type.parse()?;
    let view = match &args.view {
        Some(_) if chart_type != ChartType::DemandHeatmap => {
            anyhow::bail!("--view applies to demand_heatmap only")
        }
        Some(name) => Some(name.parse::<HeatmapView>()?),
        None => None,
    };
    let query = args.route.query()?;

    let outcome = pipeline.data.fetch(&query, None).await;
    eprintln!(
        "{} {} records for {}",
        outcome.records.len(),
        outcome.source,
        query.route_label()
    );
    let out = match view {
        Some(view) => serde_json::to_string_pretty(&build_heatmap_view(view, &outcome.records))?,
        None => serde_json::to_string_pretty(&build_chart(chart_type, &outcome.records))?,
    };
    println!("{}", out);
    Ok(())
}
