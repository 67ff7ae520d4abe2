use serde::Deserialize;
use std::collections::HashMap;

/// WhatsApp Cloud API settings.
///
/// Every field is optional at load time; missing values degrade to warnings or
/// forbidden responses at request time instead of failing startup.
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppConfig {
    /// Shared secret echoed back during the webhook handshake.
    pub verify_token: Option<String>,
    /// Bearer token for the messaging API.
    pub access_token: Option<String>,
    /// Sender phone-number id used in the messages endpoint path.
    pub phone_number_id: Option<String>,
    /// App secret used to sign webhook payloads.
    pub app_secret: Option<String>,
    /// Accept unsigned webhook events when no app secret is configured.
    pub allow_unsigned: bool,
    pub api_base_url: String,
    pub api_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Postgres URL. `None` runs with the in-memory lead store.
    pub database_url: Option<String>,
    /// Slug of the company record that owns website leads.
    pub company_slug: String,
    /// Display name used when seeding the in-memory store.
    pub company_name: String,
    pub http_timeout_secs: u64,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub whatsapp: WhatsAppConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        if let Some(ref url) = config.database_url {
            tracing::debug!("Database URL: {}...", url.chars().take(20).collect::<String>());
        } else {
            tracing::warn!("DATABASE_URL not set - leads will be kept in memory only");
        }
        tracing::debug!("Lead company slug: {}", config.company_slug);
        tracing::debug!(
            "WhatsApp API: {}/{}",
            config.whatsapp.api_base_url,
            config.whatsapp.api_version
        );
        tracing::debug!("Server Port: {}", config.port);

        if config.whatsapp.verify_token.is_none() {
            tracing::warn!("WHATSAPP_VERIFY_TOKEN not set - webhook handshakes will be refused");
        }
        if config.whatsapp.access_token.is_none() || config.whatsapp.phone_number_id.is_none() {
            tracing::warn!(
                "WHATSAPP_ACCESS_TOKEN or WHATSAPP_PHONE_NUMBER_ID not set - replies will not be sent"
            );
        }
        match (&config.whatsapp.app_secret, config.whatsapp.allow_unsigned) {
            (None, true) => tracing::warn!(
                "⚠️  WHATSAPP_APP_SECRET not set and WHATSAPP_ALLOW_UNSIGNED=true - webhook signatures are NOT verified"
            ),
            (None, false) => tracing::warn!(
                "WHATSAPP_APP_SECRET not set - all webhook events will be rejected"
            ),
            _ => {}
        }

        Ok(config)
    }

    /// Builds the configuration from a key lookup function.
    ///
    /// `from_env` passes `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL")
            .or_else(|| var("DB_URL"))
            .map(|url| {
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                }
                Ok(url)
            })
            .transpose()?;

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let http_timeout_secs: u64 = parse_number(var("HTTP_TIMEOUT_SECS"), 15, "HTTP_TIMEOUT_SECS")?;
        let rate_limit_per_second: u64 =
            parse_number(var("RATE_LIMIT_PER_SECOND"), 2, "RATE_LIMIT_PER_SECOND")?;
        let rate_limit_burst: u32 = parse_number(var("RATE_LIMIT_BURST"), 10, "RATE_LIMIT_BURST")?;
        if rate_limit_per_second == 0 || rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be greater than zero");
        }

        let api_base_url = var("WHATSAPP_API_BASE_URL")
            .unwrap_or_else(|| "https://graph.facebook.com".to_string());
        let parsed = url::Url::parse(&api_base_url)
            .map_err(|e| anyhow::anyhow!("WHATSAPP_API_BASE_URL is not a valid URL: {}", e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("WHATSAPP_API_BASE_URL must start with http:// or https://");
        }

        let allow_unsigned = match var("WHATSAPP_ALLOW_UNSIGNED").as_deref() {
            None => false,
            Some(v) => parse_bool(v).ok_or_else(|| {
                anyhow::anyhow!("WHATSAPP_ALLOW_UNSIGNED must be true or false, got '{}'", v)
            })?,
        };

        Ok(Self {
            port,
            database_url,
            company_slug: var("LEAD_COMPANY_SLUG").unwrap_or_else(|| "default".to_string()),
            company_name: var("LEAD_COMPANY_NAME").unwrap_or_else(|| "Default".to_string()),
            http_timeout_secs,
            rate_limit_per_second,
            rate_limit_burst,
            whatsapp: WhatsAppConfig {
                verify_token: var("WHATSAPP_VERIFY_TOKEN"),
                access_token: var("WHATSAPP_ACCESS_TOKEN"),
                phone_number_id: var("WHATSAPP_PHONE_NUMBER_ID"),
                app_secret: var("WHATSAPP_APP_SECRET"),
                allow_unsigned,
                api_base_url: api_base_url.trim_end_matches('/').to_string(),
                api_version: var("WHATSAPP_API_VERSION").unwrap_or_else(|| "v21.0".to_string()),
            },
        })
    }

    /// Convenience for tests: configuration from literal key/value pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<Self> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_lookup(|key| map.get(key).cloned())
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<String>,
    default: T,
    name: &str,
) -> anyhow::Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", name, v)),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
