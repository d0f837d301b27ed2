use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::parser::{ColumnLabelMap, FallbackPolicy, ParserOptions};
use crate::passthrough::{FetchPolicy, DEFAULT_BYPASS_HOSTS};

pub const DEFAULT_CONFIG_FILE: &str = "itinerary.toml";
const ENV_PREFIX: &str = "ITINERARY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub refine_location: bool,
    pub fallback: FallbackPolicy,
    /// Extra header synonyms, merged over the built-in label map.
    pub labels: BTreeMap<String, String>,
    pub bypass_hosts: Vec<String>,
    pub claim_immediately: bool,
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refine_location: true,
            fallback: FallbackPolicy::default(),
            labels: BTreeMap::new(),
            bypass_hosts: DEFAULT_BYPASS_HOSTS.iter().map(|h| h.to_string()).collect(),
            claim_immediately: true,
            pretty: false,
        }
    }
}

impl Settings {
    /// Optional TOML file, overridden by `ITINERARY_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let settings: Settings = Config::builder()
            .add_source(File::from(file).required(path.is_some()))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        info!(settings_loaded = ?settings, msg = "Loaded settings");
        Ok(settings)
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            labels: ColumnLabelMap::default().extend(self.labels.clone()),
            refine_location: self.refine_location,
            fallback: self.fallback,
        }
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy::new(self.bypass_hosts.iter().cloned()).claim_immediately(self.claim_immediately)
    }
}
