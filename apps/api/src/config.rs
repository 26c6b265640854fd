use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::export::config::{ExportDefaults, MarginProfile, PaperSize};
use crate::export::PipelineSettings;
use crate::frame::RetryPolicy;

/// Application configuration loaded from environment variables.
/// Everything has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the AI backend. Assist routes answer 503 without it.
    pub assist_backend_url: Option<String>,
    /// Where rasterized PDFs are written. Kept in memory when unset.
    pub export_dir: Option<PathBuf>,
    /// Print command (e.g. `lp`). Without it print documents are returned
    /// to the caller instead.
    pub print_command: Option<String>,
    pub default_paper: PaperSize,
    pub default_margins: MarginProfile,
    pub frame_poll_interval_ms: u64,
    pub frame_poll_attempts: u32,
    pub print_timeout_secs: u64,
    pub raster_scale: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raster_scale: f32 = parse_or(&optional, "RASTER_SCALE", 2.0)?;
        if !(raster_scale.is_finite() && raster_scale > 0.0) {
            return Err(anyhow!("RASTER_SCALE must be a positive number"));
        }

        Ok(Config {
            port: parse_or(&optional, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            assist_backend_url: optional("ASSIST_BACKEND_URL"),
            export_dir: optional("EXPORT_DIR").map(PathBuf::from),
            print_command: optional("PRINT_COMMAND"),
            default_paper: parse_with(&optional, "DEFAULT_PAPER", PaperSize::A4)?,
            default_margins: parse_with(&optional, "DEFAULT_MARGINS", MarginProfile::Resume)?,
            frame_poll_interval_ms: parse_or(&optional, "FRAME_POLL_INTERVAL_MS", 100)?,
            frame_poll_attempts: parse_or(&optional, "FRAME_POLL_ATTEMPTS", 20)?,
            print_timeout_secs: parse_or(&optional, "PRINT_TIMEOUT_SECS", 30)?,
            raster_scale,
        })
    }

    pub fn export_defaults(&self) -> ExportDefaults {
        ExportDefaults {
            paper: self.default_paper,
            margins: self.default_margins,
        }
    }

    pub fn pipeline(&self) -> PipelineSettings {
        PipelineSettings {
            retry: RetryPolicy {
                interval: Duration::from_millis(self.frame_poll_interval_ms),
                max_attempts: self.frame_poll_attempts.max(1),
            },
            raster_scale: self.raster_scale,
            print_timeout: Duration::from_secs(self.print_timeout_secs),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Like `parse_or` for types whose `FromStr` error is a plain message.
fn parse_with<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr<Err = String>,
{
    match lookup(key) {
        Some(raw) => raw.parse::<T>().map_err(|e| anyhow!("{key}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.assist_backend_url.is_none());
        assert_eq!(config.default_paper, PaperSize::A4);
        assert_eq!(config.default_margins, MarginProfile::Resume);

        let pipeline = config.pipeline();
        assert_eq!(pipeline, PipelineSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("DEFAULT_PAPER", "letter"),
            ("DEFAULT_MARGINS", "small"),
            ("FRAME_POLL_ATTEMPTS", "5"),
            ("PRINT_COMMAND", "lp -d office"),
            ("EXPORT_DIR", "/tmp/exports"),
            ("ASSIST_BACKEND_URL", "  "),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.default_paper, PaperSize::Letter);
        assert_eq!(config.default_margins, MarginProfile::Small);
        assert_eq!(config.pipeline().retry.max_attempts, 5);
        assert_eq!(config.print_command.as_deref(), Some("lp -d office"));
        assert_eq!(config.export_dir, Some(PathBuf::from("/tmp/exports")));
        assert!(config.assist_backend_url.is_none());
    }

    #[test]
    fn test_malformed_values_fail() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("DEFAULT_PAPER", "A3")]).is_err());
        assert!(config(&[("RASTER_SCALE", "0")]).is_err());
        assert!(config(&[("PRINT_TIMEOUT_SECS", "-1")]).is_err());
    }
}
