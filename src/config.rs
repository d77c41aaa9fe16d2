use clap::Parser;
use std::path::PathBuf;

use crate::client::Credentials;
use crate::controller::DEFAULT_CHAT_MODEL;
use crate::session::{ImageDetail, ParameterUpdate, Parameters};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Terminal chat client for OpenAI-compatible inference APIs.
///
/// Nothing given here is written to disk.
#[derive(Debug, Parser)]
#[command(name = "keychat", version, about)]
pub struct Config {
    /// API base URL; must start with https:// and end with /v1.
    #[arg(long, env = "KEYCHAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Bearer key for the API. Falls back to OPENAI_API_KEY.
    #[arg(long, env = "KEYCHAT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat model used until one is picked from the catalog.
    #[arg(long, env = "KEYCHAT_DEFAULT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    pub default_model: String,

    /// Initial system message.
    #[arg(long, default_value = "")]
    pub system: String,

    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    #[arg(long, default_value_t = 300)]
    pub max_tokens: u32,

    /// Detail level for attached images: low or high.
    #[arg(long, default_value = "low", value_parser = parse_image_detail)]
    pub image_detail: ImageDetail,

    /// Where tracing output goes; the terminal is taken by the UI.
    #[arg(long, env = "KEYCHAT_LOG_FILE", default_value = "keychat.log")]
    pub log_file: PathBuf,
}

fn parse_image_detail(value: &str) -> Result<ImageDetail, String> {
    ImageDetail::parse(value).ok_or_else(|| format!("expected 'low' or 'high', got '{}'", value))
}

impl Config {
    pub fn credentials(&self) -> Credentials {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_default();
        Credentials::new(self.base_url.trim(), api_key.trim())
    }

    /// Starting parameters, clamped like any later update.
    pub fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::default();
        parameters.apply(ParameterUpdate {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            image_detail: Some(self.image_detail),
        });
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_client() {
        let config = Config::try_parse_from(["keychat", "--api-key", "sk-x"]).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.parameters(), Parameters::default());
        assert_eq!(config.credentials().api_key, "sk-x");
    }

    #[test]
    fn out_of_range_parameters_are_clamped() {
        let config = Config::try_parse_from([
            "keychat",
            "--temperature",
            "9",
            "--max-tokens",
            "5",
            "--image-detail",
            "HIGH",
        ])
        .unwrap();
        let parameters = config.parameters();
        assert_eq!(parameters.temperature, 2.0);
        assert_eq!(parameters.max_tokens, 100);
        assert_eq!(parameters.image_detail, ImageDetail::High);
    }

    #[test]
    fn bad_image_detail_is_rejected() {
        assert!(Config::try_parse_from(["keychat", "--image-detail", "medium"]).is_err());
    }
}
