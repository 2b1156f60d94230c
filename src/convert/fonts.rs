//! Font name mapping for document conversion.
//!
//! Documents name their fonts the way the authoring locale does (`宋体`,
//! `微软雅黑`, ...). The table maps those names to the physical font names
//! written into the generated PDF. Names not in the table pass through
//! unchanged.
//!
//! The bundled table ships in `assets/font_map.json`. A user file in the
//! same format (a flat JSON object of `"name": "font"` pairs) extends it and
//! wins on conflicts.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::Result;

const BUNDLED_FONT_MAP: &str = include_str!("../../assets/font_map.json");

/// Mapping from document font names to physical font names.
///
/// Serialized as the flat JSON object it is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontTable {
    entries: BTreeMap<String, String>,
}

impl FontTable {
    /// An empty table: every name maps to itself.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table shipped with the crate.
    pub fn bundled() -> anyhow::Result<Self> {
        Self::from_json(BUNDLED_FONT_MAP).context("bundled font map is malformed")
    }

    /// Parse a table from a JSON object.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a table from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read font map {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid font map {}", path.display()))
    }

    /// The bundled table extended by the user file named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BindError::InvalidConfig`] if the user file cannot
    /// be read or parsed.
    pub fn load(config: &Config) -> Result<Self> {
        let mut table = Self::bundled()?;

        if let Some(path) = &config.font_map {
            let overrides = Self::from_file(path)?;
            debug!(
                "Loaded {} font mapping(s) from {}",
                overrides.len(),
                path.display()
            );
            table.extend(overrides);
        }

        Ok(table)
    }

    /// Add or replace entries with those of `other`.
    pub fn extend(&mut self, other: FontTable) {
        self.entries.extend(other.entries);
    }

    /// Add or replace one mapping.
    pub fn insert(&mut self, name: impl Into<String>, font: impl Into<String>) {
        self.entries.insert(name.into(), font.into());
    }

    /// Physical font for `name`; `name` itself when unmapped.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no mappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
