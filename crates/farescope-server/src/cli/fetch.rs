use crate::cli::FetchArgs;
use crate::pipeline::{check_rows, Pipeline};
use anyhow::Result;

pub async fn run(args: &FetchArgs, pipeline: &Pipeline) -> Result<()> {
    let query = args.route.query()?;
    let rows = check_rows(args.rows)?;

    let analysis = pipeline.analyze(&query, rows).await;
    let out = if args.summary_only {
        serde_json::to_string_pretty(&analysis.summary)?
    } else {
        serde_json::to_string_pretty(&analysis)?
    };
    println!("{}", out);
    Ok(())
}
