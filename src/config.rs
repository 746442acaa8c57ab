use std::{path::PathBuf, str::FromStr};

use crate::{errors::AppError, models::geo::LatLng};

pub const DEFAULT_CHAT_PREAMBLE: &str = "You are Pali Pal, a friendly fire-recovery assistant.";

/// Runtime settings read from the process environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// No URL means the in-memory store is used.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,

    pub uploads_dir: PathBuf,
    pub uploads_public_path: String,
    pub max_upload_bytes: usize,

    pub chat_completions_url: Option<String>,
    pub chat_api_key: Option<String>,
    pub chat_preamble: String,
    pub chat_history_limit: usize,

    pub hosting_api_base: Option<String>,
    pub hosting_api_key: Option<String>,
    pub project_id: String,

    pub kyc_provider_url: Option<String>,
    /// Shared secret the hosting platform sends with comment webhooks.
    /// Unset means every webhook call is refused.
    pub comment_webhook_secret: Option<String>,

    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<i64>,

    pub notification_icon: String,
    pub daily_summary_hour: u32,
    pub map_center: LatLng,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let jwt_secret = required("JWT_SECRET")?;

        let daily_summary_hour = parsed("DAILY_SUMMARY_HOUR", 9u32)?;
        if daily_summary_hour > 23 {
            return Err(AppError::EnvError(format!(
                "DAILY_SUMMARY_HOUR must be between 0 and 23, got {daily_summary_hour}"
            )));
        }

        let telegram_chat_id = match optional("TELEGRAM_CHAT_ID") {
            Some(raw) => Some(raw.parse::<i64>().map_err(|e| {
                AppError::EnvError(format!("TELEGRAM_CHAT_ID is not a valid chat id: {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            port: parsed("PORT", 3001u16)?,
            redis_url: optional("REDIS_URL"),
            jwt_secret,
            allowed_origins: optional("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            uploads_dir: PathBuf::from(
                optional("UPLOADS_DIR").unwrap_or_else(|| "uploads".to_string()),
            ),
            uploads_public_path: optional("UPLOADS_PUBLIC_PATH")
                .unwrap_or_else(|| "/uploads".to_string()),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            chat_completions_url: optional("CHAT_COMPLETIONS_URL"),
            chat_api_key: optional("CHAT_API_KEY"),
            chat_preamble: optional("CHAT_PREAMBLE")
                .unwrap_or_else(|| DEFAULT_CHAT_PREAMBLE.to_string()),
            chat_history_limit: parsed("CHAT_HISTORY_LIMIT", 50usize)?,
            hosting_api_base: optional("HOSTING_API_BASE"),
            hosting_api_key: optional("HOSTING_API_KEY"),
            project_id: optional("PROJECT_ID").unwrap_or_else(|| "mock_project".to_string()),
            kyc_provider_url: optional("KYC_PROVIDER_URL"),
            comment_webhook_secret: optional("COMMENT_WEBHOOK_SECRET"),
            telegram_bot_token: optional("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id,
            notification_icon: optional("NOTIFICATION_ICON")
                .unwrap_or_else(|| "pali-pal-avatar.png".to_string()),
            daily_summary_hour,
            map_center: LatLng {
                lat: parsed("MAP_CENTER_LAT", 34.055f64)?,
                lng: parsed("MAP_CENTER_LNG", -118.54f64)?,
            },
        })
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String, AppError> {
    optional(key).ok_or_else(|| AppError::EnvError(format!("{key} must be set")))
}

fn parsed<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::EnvError(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}
