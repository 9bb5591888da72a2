//! Configuration validation

use crate::{AppConfig, ConfigError, ModuleMode, Result};
use eclipse_batch_types::{DelayRange, KnownModule};

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let errors = collect_violations(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        Err(ConfigError::ValidationError(error_messages.join("; ")))
    }
}

/// Every violation in the configuration, in field order
pub fn collect_violations(config: &AppConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Network
    if let Err(e) = validate_log_level(&config.network.log_level) {
        errors.push(e);
    }

    if let Err(e) = validate_url(&config.network.rpc_url) {
        errors.push(ValidationError::new("network.rpc_url", e));
    }

    if let Err(e) = validate_url(&config.network.scan_url) {
        errors.push(ValidationError::new("network.scan_url", e));
    }

    // Threads
    if config.threads.enabled && config.threads.count == 0 {
        errors.push(ValidationError::new(
            "threads.count",
            "must be at least 1 when threads are enabled",
        ));
    }

    // Modules
    let modules = &config.modules;
    if !modules.modules_count.is_valid() {
        errors.push(ValidationError::new(
            "modules.modules_count",
            format!(
                "min ({}) must be <= max ({})",
                modules.modules_count.min, modules.modules_count.max
            ),
        ));
    }

    for (idx, name) in modules.sequence.iter().enumerate() {
        if KnownModule::from_name(name).is_none() {
            errors.push(ValidationError::new(
                format!("modules.sequence[{idx}]"),
                format!("unknown module '{name}'"),
            ));
        }
    }

    if modules.mode == ModuleMode::Random && modules.modules_count.max > 0 {
        let selectable = modules
            .enabled
            .iter()
            .any(|module| module != KnownModule::BRIDGE);
        if !selectable {
            errors.push(ValidationError::new(
                "modules.enabled",
                "random mode needs at least one enabled module besides the bridge",
            ));
        }
    }

    // Delays
    validate_delay_range(
        "delay.between_accounts",
        &config.delay.between_accounts,
        &mut errors,
    );
    validate_delay_range(
        "delay.between_modules",
        &config.delay.between_modules,
        &mut errors,
    );
    validate_delay_range(
        "delay.between_retries",
        &config.delay.between_retries.range(),
        &mut errors,
    );

    if config.delay.between_retries.attempts == 0 {
        errors.push(ValidationError::new(
            "delay.between_retries.attempts",
            "must be at least 1",
        ));
    }

    // Swap amounts
    for (field, range) in [
        ("swaps.native.eth", &config.swaps.native.eth),
        ("swaps.native.sol", &config.swaps.native.sol),
        ("swaps.stable", &config.swaps.stable),
    ] {
        if !range.is_valid() {
            errors.push(ValidationError::new(
                field,
                "amount and precision bounds must be non-negative with min <= max",
            ));
        }
    }

    // Telegram
    if config.telegram.enabled {
        if config.telegram.bot_token.trim().is_empty() {
            errors.push(ValidationError::new(
                "telegram.bot_token",
                "bot token is required when telegram is enabled",
            ));
        }

        if config.telegram.user_id == 0 {
            errors.push(ValidationError::new(
                "telegram.user_id",
                "user id is required when telegram is enabled",
            ));
        }
    }

    errors
}

fn validate_delay_range(field: &str, range: &DelayRange, errors: &mut Vec<ValidationError>) {
    if !range.is_valid() {
        errors.push(ValidationError::new(
            field,
            format!(
                "bounds must satisfy 0 <= min ({}) <= max ({})",
                range.min, range.max
            ),
        ));
    }
}

/// Validate URL format
fn validate_url(url: &str) -> std::result::Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    Ok(())
}

/// Validate log level
fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

    if !VALID_LEVELS.contains(&level.to_lowercase().as_str()) {
        return Err(ValidationError::new(
            "network.log_level",
            format!(
                "invalid log level '{}', must be one of: {}",
                level,
                VALID_LEVELS.join(", ")
            ),
        ));
    }

    Ok(())
}
