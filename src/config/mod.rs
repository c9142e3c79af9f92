#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::cli::CliConfig;
use crate::config::toml_config::TomlConfig;
use crate::core::window::{DEFAULT_LOOKBACK_HOURS, MAX_LOOKBACK_HOURS};
use crate::domain::model::Origin;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use chrono_tz::Tz;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://data.cityofnewyork.us/resource/erm2-nwe9.json";
/// Socrata 單次請求的實際上限
pub const DEFAULT_LIMIT: usize = 50_000;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;
pub const DEFAULT_ORIGIN_LABEL: &str = "nyc";

/// Resolved run settings: defaults, then the TOML file, then CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub limit: usize,
    pub origin: Origin,
    pub app_token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub hours: i64,
    pub output_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            limit: DEFAULT_LIMIT,
            origin: Origin::default(),
            app_token: None,
            timeout_seconds: None,
            hours: DEFAULT_LOOKBACK_HOURS,
            output_path: None,
        }
    }
}

impl Settings {
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(endpoint) = &config.source.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(limit) = config.source.limit {
            settings.limit = limit;
        }
        settings.app_token = config.source.app_token.clone().filter(|t| !t.is_empty());
        settings.timeout_seconds = config.source.timeout_seconds;

        if let Some(hours) = config.window.hours {
            settings.hours = hours;
        }
        settings.origin = resolve_origin(
            settings.origin,
            ("window.timezone", config.window.timezone.as_deref()),
            config.window.origin_label.as_deref(),
        )?;

        settings.output_path = config.load.output_path.clone();
        Ok(settings)
    }

    /// 載入設定檔 (若有) 並套用命令列覆蓋
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Self::from_toml(&TomlConfig::from_file(path)?)?
            }
            None => Self::default(),
        };

        if let Some(endpoint) = &cli.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(limit) = cli.limit {
            settings.limit = limit;
        }
        settings.origin = resolve_origin(
            settings.origin,
            ("timezone", cli.timezone.as_deref()),
            cli.origin_label.as_deref(),
        )?;
        if let Some(token) = cli.app_token.as_ref() {
            // 空字串視同未設定，不送出 X-App-Token
            settings.app_token = Some(token.clone()).filter(|t| !t.is_empty());
        }
        if let Some(hours) = cli.hours {
            settings.hours = hours;
        }
        if let Some(output) = &cli.output {
            settings.output_path = Some(output.clone());
        }

        Ok(settings)
    }
}

/// 時區覆蓋但未給標籤時，標籤跟著時區走，不沿用 `nyc`
fn resolve_origin(
    current: Origin,
    (field, timezone): (&str, Option<&str>),
    label: Option<&str>,
) -> Result<Origin> {
    let mut origin = match timezone {
        Some(name) => Origin::for_timezone(parse_timezone(field, name)?),
        None => current,
    };
    if let Some(label) = label {
        origin.label = label.to_string();
    }
    Ok(origin)
}

fn parse_timezone(field: &str, name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| EtlError::InvalidConfigValueError {
            field: field.to_string(),
            value: name.to_string(),
            reason: format!("Unknown IANA timezone: {}", e),
        })
}

impl ConfigProvider for Settings {
    fn api_endpoint(&self) -> &str {
        &self.endpoint
    }

    fn row_limit(&self) -> usize {
        self.limit
    }

    fn origin(&self) -> &Origin {
        &self.origin
    }

    fn app_token(&self) -> Option<&str> {
        self.app_token.as_deref()
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "source.endpoint".to_string(),
            });
        }
        validate_url("source.endpoint", &self.endpoint)?;
        validate_positive_number("source.limit", self.limit, 1)?;
        validate_range("window.hours", self.hours, 1, MAX_LOOKBACK_HOURS)?;
        validate_non_empty_string("window.origin_label", &self.origin.label)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }
        if let Some(path) = &self.output_path {
            validate_path("load.output_path", path)?;
        }
        Ok(())
    }
}
