use serde::Serialize;

use crate::config::Config;

/// Health payload mirroring the serverless credential check: a success body
/// when the Gemini key is configured, an error body otherwise.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HealthReport {
    Ready { success: bool, message: String },
    Error { error: String },
}

pub fn check(config: &Config) -> HealthReport {
    if config.has_gemini_api_key() {
        HealthReport::Ready {
            success: true,
            message: "API READY".to_string(),
        }
    } else {
        HealthReport::Error {
            error: "GEMINI_API_KEY is not configured".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> Config {
        let mut config = Config::load();
        config.gemini_api_key = key.to_string();
        config
    }

    #[test]
    fn reports_ready_when_key_is_present() {
        let report = check(&config_with_key("test-key"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "API READY");
    }

    #[test]
    fn reports_error_when_key_is_missing() {
        let report = check(&config_with_key("  "));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"], "GEMINI_API_KEY is not configured");
        assert!(json.get("success").is_none());
    }
}
