use crate::app_config::{AppConfig, FailurePolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_nonzero_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_nonzero_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let completion_base_url = or_default(
        "LOWERATED_COMPLETION_BASE_URL",
        "https://api.openai.com/v1",
    );
    let model = or_default("LOWERATED_MODEL", "gpt-3.5-turbo");
    let max_tokens = parse_u32("LOWERATED_MAX_TOKENS", "150")?;

    let temperature = or_default("LOWERATED_TEMPERATURE", "0.7")
        .parse::<f32>()
        .map_err(|e| invalid("LOWERATED_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(
            "LOWERATED_TEMPERATURE",
            format!("{temperature} is outside 0.0..=2.0"),
        ));
    }

    let chunk_size = parse_nonzero_usize("LOWERATED_CHUNK_SIZE", "4000")?;
    let request_timeout_secs = parse_nonzero_u64("LOWERATED_REQUEST_TIMEOUT_SECS", "60")?;
    let max_concurrent_requests = parse_nonzero_usize("LOWERATED_MAX_CONCURRENT_REQUESTS", "1")?;
    let max_retries = parse_u32("LOWERATED_MAX_RETRIES", "0")?;
    let retry_backoff_base_ms = parse_u64("LOWERATED_RETRY_BACKOFF_BASE_MS", "1000")?;
    let failure_policy = parse_failure_policy(&or_default("LOWERATED_FAILURE_POLICY", "abort"))?;
    let catalog_path = PathBuf::from(or_default(
        "LOWERATED_CATALOG_PATH",
        "./config/entities.json",
    ));
    let log_level = or_default("LOWERATED_LOG_LEVEL", "info");

    Ok(AppConfig {
        openai_api_key,
        completion_base_url,
        model,
        max_tokens,
        temperature,
        chunk_size,
        request_timeout_secs,
        max_concurrent_requests,
        max_retries,
        retry_backoff_base_ms,
        failure_policy,
        catalog_path,
        log_level,
    })
}

/// Parse a string into a `FailurePolicy` variant.
fn parse_failure_policy(s: &str) -> Result<FailurePolicy, ConfigError> {
    match s {
        "abort" => Ok(FailurePolicy::Abort),
        "skip" => Ok(FailurePolicy::SkipFailed),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOWERATED_FAILURE_POLICY".to_string(),
            reason: format!("unknown policy '{other}'; expected 'abort' or 'skip'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
