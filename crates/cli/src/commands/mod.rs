pub mod browse;
pub mod config;
pub mod doctor;
pub mod list;

use prodcat_core::config::{AppConfig, LoadOptions};
use prodcat_core::{ApplicationError, Catalog, Dataset, SortKey};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn output(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads configuration and builds the catalog it points at.
pub fn load_catalog(options: LoadOptions) -> Result<(AppConfig, Catalog), ApplicationError> {
    let config = AppConfig::load(options)?;
    let dataset = Dataset::load(config.dataset.path.as_deref())?;
    Ok((config, Catalog::new(dataset)))
}

pub fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "id" => Ok(SortKey::Id),
        "product" | "name" => Ok(SortKey::Product),
        "category" => Ok(SortKey::Category),
        "user" | "owner" => Ok(SortKey::User),
        other => Err(format!("unknown sort key `{other}` (expected id|product|category|user)")),
    }
}
