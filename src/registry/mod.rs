use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::error::{PipelineError, Result};
use crate::domain::{VenueClass, VenueRecord};

/// Per-venue pipeline configuration.
///
/// Each scraper used to carry its own copy of these values as inline
/// constants; here they are one data record injected into the shared
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueProfile {
    /// Venue defaults applied when a candidate carries only a bare name.
    pub venue: VenueRecord,
    /// Picks the category vocabulary.
    pub venue_class: VenueClass,
    /// Assumed event length when only a start time is known.
    #[serde(default = "default_duration_hours")]
    pub default_duration_hours: i64,
    /// Price string used when nothing can be extracted from the text.
    #[serde(default = "default_price")]
    pub price_default: String,
    /// Base for resolving relative source/image URLs.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_duration_hours() -> i64 {
    3
}

fn default_price() -> String {
    "See website for details".to_string()
}

/// Registry mapping source ids to venue profiles.
#[derive(Debug, Default)]
pub struct VenueRegistry {
    profiles: HashMap<String, VenueProfile>,
}

/// On-disk registry document: a `[sources.<id>]` table per venue.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    sources: HashMap<String, VenueProfile>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_id: impl Into<String>, profile: VenueProfile) {
        self.profiles.insert(source_id.into(), profile);
    }

    pub fn get(&self, source_id: &str) -> Result<&VenueProfile> {
        self.profiles
            .get(source_id)
            .ok_or_else(|| PipelineError::UnknownSource(source_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn from_toml_str(doc: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(doc)?;
        info!(sources = file.sources.len(), "loaded venue registry");
        Ok(Self {
            profiles: file.sources,
        })
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let doc = std::fs::read_to_string(path)?;
        Self::from_toml_str(&doc)
    }
}
