use std::path::{Path, PathBuf};
use std::time::Duration;

use dctx_lib::{Config, DctxError, OutputFormat};

use crate::cli::RenderArgs;

/// Resolved settings after merging CLI args and config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub depth: Option<u32>,
    pub format: OutputFormat,
    pub request_timeout: Duration,
    pub base_url: String,
    pub assets_dir: PathBuf,
}

/// Merge CLI arguments with config file, preferring CLI values when given.
pub fn resolve_settings(
    render: &RenderArgs,
    cli_dir: Option<&Path>,
    config: &Config,
) -> ResolvedSettings {
    ResolvedSettings {
        depth: render.depth.or(config.depth),
        format: render.format.unwrap_or(config.format),
        request_timeout: config.timeouts.request,
        base_url: config.api.base_url.clone(),
        assets_dir: cli_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.assets.dir.clone()),
    }
}

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/dctx/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, DctxError> {
    let cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        DctxError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;

    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        DctxError::Config(prefix)
    })?;
    Ok(cfg)
}

/// Format effective settings as a single-line string.
pub fn format_effective_settings(settings: &ResolvedSettings, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let depth = settings
        .depth
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unlimited".to_string());
    format!(
        "Effective config [{source}]: depth={depth}, format={:?}, request-timeout={}s, api={}, assets-dir={}",
        settings.format,
        settings.request_timeout.as_secs(),
        settings.base_url,
        settings.assets_dir.display()
    )
}
