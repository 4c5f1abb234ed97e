//! Pattern library for PII detection

use crate::domain::PiiCategory;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Rule definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDefinition {
    /// Rule name, used in logs and error messages
    pub name: String,
    /// PII category key
    pub category: String,
    /// Regex patterns for this rule
    pub patterns: Vec<String>,
    /// Whether the rule rewrites text during in-place masking
    #[serde(default = "default_mask_in_place")]
    pub mask_in_place: bool,
}

fn default_mask_in_place() -> bool {
    true
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Name of the rule this pattern belongs to
    pub rule: String,
    /// Compiled regex
    pub regex: Regex,
    /// PII category
    pub category: PiiCategory,
    /// Whether masking rewrites matches of this pattern
    pub mask_in_place: bool,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    rules: Vec<RuleDefinition>,
}

/// Ordered, read-only catalog of recognition rules
///
/// Built once and shared (`Arc`) between the detector and the masker.
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();

        for def in library.rules {
            let category = PiiCategory::from_key(&def.category).with_context(|| {
                format!("Unknown category in rule '{}': {}", def.name, def.category)
            })?;

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str).with_context(|| {
                    format!("Invalid regex in rule '{}': {pattern_str}", def.name)
                })?;

                patterns.push(CompiledPattern {
                    rule: def.name.clone(),
                    regex,
                    category: category.clone(),
                    mask_in_place: def.mask_in_place,
                });
            }
        }

        if patterns.is_empty() {
            anyhow::bail!("Pattern library defines no rules");
        }

        Ok(Self { patterns })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../patterns/pii_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns, in catalog order
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Patterns that rewrite text during masking, in catalog order
    pub fn masking_patterns(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter().filter(|p| p.mask_in_place)
    }

    /// Get patterns for a specific category
    pub fn patterns_for_category<'a>(
        &'a self,
        category: &'a PiiCategory,
    ) -> impl Iterator<Item = &'a CompiledPattern> {
        self.patterns.iter().filter(move |p| &p.category == category)
    }

    /// Distinct categories, in order of first appearance
    pub fn categories(&self) -> Vec<PiiCategory> {
        let mut categories: Vec<PiiCategory> = Vec::new();
        for pattern in &self.patterns {
            if !categories.contains(&pattern.category) {
                categories.push(pattern.category.clone());
            }
        }
        categories
    }
}
