use std::fmt;
use std::fs;
use std::str::FromStr;

use log::{debug, info};
use tera::{Context, Tera};

use crate::config::PersonaConfig;
use crate::error::ConfigError;

const STRICT: &str = include_str!("templates/strict.tera");
const BALANCED: &str = include_str!("templates/balanced.tera");
const RELAXED: &str = include_str!("templates/relaxed.tera");

/// Built-in system prompt policies. They differ in how hard off-topic
/// questions are redirected and how often the user is pointed at a loan officer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersonaVariant {
    /// Refuses anything off-topic, closes every answer with a call to action.
    Strict,
    #[default]
    Balanced,
    /// Answers small talk briefly, only suggests contact when asked.
    Relaxed,
}

impl PersonaVariant {
    fn template(self) -> &'static str {
        match self {
            PersonaVariant::Strict => STRICT,
            PersonaVariant::Balanced => BALANCED,
            PersonaVariant::Relaxed => RELAXED,
        }
    }
}

impl FromStr for PersonaVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PersonaVariant::Strict),
            "balanced" => Ok(PersonaVariant::Balanced),
            "relaxed" => Ok(PersonaVariant::Relaxed),
            _ => Err(ConfigError::UnknownPersona(s.to_string())),
        }
    }
}

impl fmt::Display for PersonaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PersonaVariant::Strict => "strict",
            PersonaVariant::Balanced => "balanced",
            PersonaVariant::Relaxed => "relaxed",
        };
        f.write_str(name)
    }
}

/// The rendered system turn, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Persona {
    /// Variant name or template path, for startup logs.
    pub source: String,
    pub assistant_name: String,
    pub text: String,
}

impl Persona {
    pub fn load(config: &PersonaConfig) -> Result<Self, ConfigError> {
        let (source, template) = match &config.file {
            Some(path) => {
                let template = fs::read_to_string(path).map_err(|source| ConfigError::PersonaFile {
                    path: path.display().to_string(),
                    source,
                })?;
                (path.display().to_string(), template)
            }
            None => (config.variant.to_string(), config.variant.template().to_string()),
        };

        let mut context = Context::new();
        context.insert("brand", &config.brand);
        context.insert("brand_short", &config.brand_short);
        context.insert("assistant_name", &config.assistant_name);
        context.insert("region", &config.region);
        context.insert("spelling_rule", &config.spelling_rule);
        context.insert("misspellings", &config.misspellings);

        let text = Tera::one_off(&template, &context, false)?.trim().to_string();

        info!("Loaded persona '{}' ({} characters)", source, text.len());
        debug!("Persona text: {}", text);

        Ok(Self {
            source,
            assistant_name: config.assistant_name.clone(),
            text,
        })
    }
}
