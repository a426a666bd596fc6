use anyhow::Context;
use ferrous_chain_domain::{CliOverrides, Config};

/// Load and validate the configuration. Runs before logging is set up, so
/// failures carry their source in the error instead of a log line.
pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let source = config_path.unwrap_or("default search path");
    let config = Config::load(config_path, cli_overrides)
        .with_context(|| format!("failed to load configuration from {source}"))?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {source}"))?;
    Ok(config)
}
