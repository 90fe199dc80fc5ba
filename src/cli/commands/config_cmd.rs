//! config command - Get, set, or list configuration values

use anyhow::{bail, Context as _, Result};
use serde_json::json;

use crate::core::config::{AlertDefaults, Config, GlobalConfig, PolicyDefaults};
use crate::engine::Context;
use crate::ui::output;

/// Every key `get`, `set`, and `list` understand.
pub const KEYS: [&str; 4] = [
    "requested_by",
    "alerts.default_duration_ms",
    "policy.require_cross_country",
    "policy.transfer_resources",
];

/// Effective value of `key`, with defaults applied.
fn effective(config: &Config, key: &str) -> Result<String> {
    Ok(match key {
        "requested_by" => config.requested_by().to_string(),
        "alerts.default_duration_ms" => config.alert_duration_ms().to_string(),
        "policy.require_cross_country" => config.require_cross_country().to_string(),
        "policy.transfer_resources" => config.transfer_resources().to_string(),
        _ => bail!("Unknown configuration key: {}", key),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("{} expects true or false, got '{}'", key, value),
    }
}

/// Apply `key = value` to `global`.
fn apply(global: &mut GlobalConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "requested_by" => global.requested_by = Some(value.to_string()),
        "alerts.default_duration_ms" => {
            let ms = value
                .parse::<u64>()
                .with_context(|| format!("{} expects a number of milliseconds", key))?;
            global
                .alerts
                .get_or_insert_with(AlertDefaults::default)
                .default_duration_ms = Some(ms);
        }
        "policy.require_cross_country" => {
            global
                .policy
                .get_or_insert_with(PolicyDefaults::default)
                .require_cross_country = Some(parse_bool(key, value)?);
        }
        "policy.transfer_resources" => {
            global
                .policy
                .get_or_insert_with(PolicyDefaults::default)
                .transfer_resources = Some(parse_bool(key, value)?);
        }
        _ => bail!("Unknown configuration key: {}", key),
    }
    Ok(())
}

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let value = effective(&ctx.config, key)?;
    if ctx.json {
        output::json(&json!({ "key": key, "value": value }))?;
    } else {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut global = ctx.config.global.clone();
    apply(&mut global, key, value)?;

    // Write back to the file we loaded from, if any.
    let path = match ctx.config.loaded_from() {
        Some(path) => {
            global.validate()?;
            Config::write_config_atomic(path, &global).context("Failed to write config")?;
            path.to_path_buf()
        }
        None => Config::write_global(&global).context("Failed to write config")?,
    };

    if !ctx.quiet {
        println!("Set {} = {} in {}", key, value, path.display());
    }

    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    if ctx.json {
        let mut map = serde_json::Map::new();
        for key in KEYS {
            map.insert(key.to_string(), effective(&ctx.config, key)?.into());
        }
        output::json(&map)?;
        return Ok(());
    }

    match ctx.config.loaded_from() {
        Some(path) => println!("# Configuration ({})", path.display()),
        None => println!("# Configuration (defaults)"),
    }
    for key in KEYS {
        println!("{} = {}", key, effective(&ctx.config, key)?);
    }

    Ok(())
}
