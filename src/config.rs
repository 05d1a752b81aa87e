use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::persona::PersonaVariant;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BRAND: &str = "Warens Financial Group";
const DEFAULT_ASSISTANT: &str = "Warens Mortgage AI";
const DEFAULT_REGION: &str = "Texas";
const DEFAULT_BRAND_SHORT: &str = "Warens";
const DEFAULT_SPELLING_RULE: &str = "SIEMPRE con una sola R";
const DEFAULT_MISSPELLINGS: &str = "Warrens, Warenns, Warren’s, Worrens";

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub completion: CompletionConfig,
    pub persona: PersonaConfig,
}

#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

// Keep the credential out of logs.
impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PersonaConfig {
    pub variant: PersonaVariant,
    /// Template file that replaces the built-in variant when set.
    pub file: Option<PathBuf>,
    pub brand: String,
    /// Short brand name used in running text.
    pub brand_short: String,
    pub assistant_name: String,
    pub region: String,
    /// Extra spelling guidance after the brand name; empty disables it.
    pub spelling_rule: String,
    /// Comma-separated forbidden spellings; empty disables the line.
    pub misspellings: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            variant: PersonaVariant::default(),
            file: None,
            brand: DEFAULT_BRAND.to_string(),
            brand_short: DEFAULT_BRAND_SHORT.to_string(),
            assistant_name: DEFAULT_ASSISTANT.to_string(),
            region: DEFAULT_REGION.to_string(),
            spelling_rule: DEFAULT_SPELLING_RULE.to_string(),
            misspellings: DEFAULT_MISSPELLINGS.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source. Empty values count as unset,
    /// except for the two spelling variables where empty switches the rule off.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        let completion = CompletionConfig {
            api_key,
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: check_var(
                "TEMPERATURE",
                parse_var("TEMPERATURE", var("TEMPERATURE"), DEFAULT_TEMPERATURE)?,
                |t: &f32| t.is_finite() && *t >= 0.0,
                "must be a finite, non-negative number",
            )?,
            timeout: Duration::from_secs(check_var(
                "UPSTREAM_TIMEOUT_SECS",
                parse_var("UPSTREAM_TIMEOUT_SECS", var("UPSTREAM_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?,
                |secs: &u64| *secs > 0,
                "must be at least 1 second",
            )?),
        };

        let variant = match var("PERSONA") {
            Some(name) => name.parse()?,
            None => PersonaVariant::default(),
        };

        let defaults = PersonaConfig::default();
        let persona = PersonaConfig {
            variant,
            file: var("PERSONA_FILE").map(PathBuf::from),
            brand: var("BRAND_NAME").unwrap_or(defaults.brand),
            brand_short: var("BRAND_SHORT_NAME").unwrap_or(defaults.brand_short),
            assistant_name: var("ASSISTANT_NAME").unwrap_or(defaults.assistant_name),
            region: var("REGION").unwrap_or(defaults.region),
            spelling_rule: lookup("BRAND_SPELLING_RULE")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.spelling_rule),
            misspellings: lookup("BRAND_MISSPELLINGS")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.misspellings),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var("PORT", var("PORT"), DEFAULT_PORT)?,
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            completion,
            persona,
        })
    }
}

fn parse_var<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
            value: raw,
        }),
    }
}

/// Rejects a parsed value that is outside its valid range.
fn check_var<T, P>(name: &'static str, value: T, valid: P, reason: &str) -> Result<T, ConfigError>
where
    T: fmt::Display,
    P: Fn(&T) -> bool,
{
    if valid(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidVar {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = config_from(&[("PORT", "8080")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("OPENAI_API_KEY")));
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let err = config_from(&[("OPENAI_API_KEY", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("OPENAI_API_KEY")));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.completion.base_url, "https://api.openai.com");
        assert_eq!(config.completion.model, "gpt-4.1-mini");
        assert_eq!(config.completion.temperature, 0.7);
        assert_eq!(config.completion.timeout, Duration::from_secs(60));
        assert_eq!(config.persona.variant, PersonaVariant::Balanced);
        assert_eq!(config.persona.file, None);
        assert_eq!(config.persona.brand, "Warens Financial Group");
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8081"),
            ("TEMPERATURE", "0.2"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
            ("PERSONA", "strict"),
            ("PERSONA_FILE", "/etc/relay/persona.tera"),
            ("REGION", "Florida"),
        ])
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.completion.temperature, 0.2);
        assert_eq!(config.completion.timeout, Duration::from_secs(5));
        assert_eq!(config.persona.variant, PersonaVariant::Strict);
        assert_eq!(config.persona.file, Some(PathBuf::from("/etc/relay/persona.tera")));
        assert_eq!(config.persona.region, "Florida");
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = config_from(&[("OPENAI_API_KEY", "sk-test"), ("PORT", "eighty")]).unwrap_err();
        match err {
            ConfigError::InvalidVar { name, value, .. } => {
                assert_eq!(name, "PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_or_negative_temperature_is_rejected() {
        for raw in ["NaN", "inf", "-0.5"] {
            let err = config_from(&[("OPENAI_API_KEY", "sk-test"), ("TEMPERATURE", raw)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidVar { name: "TEMPERATURE", .. }),
                "TEMPERATURE={raw} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config_from(&[("OPENAI_API_KEY", "sk-test"), ("UPSTREAM_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "UPSTREAM_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn empty_spelling_variables_switch_rules_off() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BRAND_SPELLING_RULE", ""),
            ("BRAND_MISSPELLINGS", " "),
        ])
        .unwrap();

        assert_eq!(config.persona.spelling_rule, "");
        assert_eq!(config.persona.misspellings, "");
    }

    #[test]
    fn persona_defaults_match_the_default_config() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        let defaults = PersonaConfig::default();

        assert_eq!(config.persona.brand_short, defaults.brand_short);
        assert_eq!(config.persona.spelling_rule, defaults.spelling_rule);
        assert_eq!(config.persona.misspellings, defaults.misspellings);
        assert_eq!(config.persona.assistant_name, defaults.assistant_name);
    }

    #[test]
    fn unknown_persona_is_rejected() {
        let err = config_from(&[("OPENAI_API_KEY", "sk-test"), ("PERSONA", "pushy")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPersona(name) if name == "pushy"));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-very-secret")]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
