use crate::cli::{Cli, ConfigCommands};
use crate::config::FarescopeConfig;
use anyhow::Result;

pub async fn run(cmd: &ConfigCommands, cli: &Cli) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(cli),
        ConfigCommands::Show => show(cli),
    }
}

fn validate(cli: &Cli) -> Result<()> {
    let path = &cli.config;
    let config = if path.exists() {
        match FarescopeConfig::load(path) {
            Ok(config) => config.with_overrides(cli),
            Err(e) => {
                println!("❌ Failed to parse {}: {:#}", path.display(), e);
                std::process::exit(1);
            }
        }
    } else {
        println!("{} not found; checking defaults.", path.display());
        FarescopeConfig::default().with_overrides(cli)
    };

    let errors = config.validate();
    if errors.is_empty() {
        println!("✅ {} is valid.", path.display());
    } else {
        println!("❌ Validation errors in {}:", path.display());
        for e in &errors {
            println!("  - {}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Effective configuration. Keys are reported as present or absent only.
fn show(cli: &Cli) -> Result<()> {
    let mut config = FarescopeConfig::resolve(cli)?;
    for key in [
        &mut config.upstream.aviation_stack_api_key,
        &mut config.upstream.openai_api_key,
    ] {
        if key.is_some() {
            *key = Some("********".to_string());
        }
    }
    match toml::to_string_pretty(&config) {
        Ok(s) => println!("{}", s),
        Err(e) => anyhow::bail!("Failed to serialize config: {}", e),
    }
    Ok(())
}
