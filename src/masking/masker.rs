//! Text masking

use super::policy::RedactionPolicy;
use crate::detection::merge::is_blank_or_redacted;
use crate::detection::{MaskTarget, PatternRegistry};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::Arc;

/// Rewrites text: category rules first, then literal substitution
#[derive(Clone)]
pub struct Masker {
    pattern_registry: Arc<PatternRegistry>,
}

impl Masker {
    /// Create a masker over a shared registry
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self {
            pattern_registry: registry,
        }
    }

    /// Mask `content` with the category rules, then with `targets`
    pub fn apply_masking(&self, content: &str, targets: &[MaskTarget]) -> String {
        let masked = self.apply_category_rules(content);
        self.apply_literals(&masked, targets)
    }

    /// Replace every match of every masking rule, in catalog order
    pub fn apply_category_rules(&self, content: &str) -> String {
        let mut text = content.to_string();
        for pattern in self.pattern_registry.masking_patterns() {
            let policy = RedactionPolicy::for_category(&pattern.category);
            let replaced = pattern
                .regex
                .replace_all(&text, |caps: &Captures<'_>| policy.redact_match(caps));
            if let std::borrow::Cow::Owned(new_text) = replaced {
                text = new_text;
            }
        }
        text
    }

    /// Replace target literals in a single pass
    ///
    /// Longer literals win over their prefixes and inserted tokens are never
    /// scanned again.
    pub fn apply_literals(&self, content: &str, targets: &[MaskTarget]) -> String {
        let mut replacements: HashMap<&str, String> = HashMap::new();
        let mut literals: Vec<&str> = Vec::new();
        for target in targets {
            let literal = target.literal.trim();
            if is_blank_or_redacted(literal) || replacements.contains_key(literal) {
                continue;
            }
            let policy = RedactionPolicy::for_category(&target.category);
            replacements.insert(literal, policy.redact_literal(literal));
            literals.push(literal);
        }

        if literals.is_empty() {
            return content.to_string();
        }

        literals.sort_by_key(|l| std::cmp::Reverse(l.chars().count()));
        let alternation = literals
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");

        match Regex::new(&alternation) {
            Ok(re) => re
                .replace_all(content, |caps: &Captures<'_>| {
                    let matched = caps.get(0).map_or("", |m| m.as_str());
                    replacements
                        .get(matched)
                        .cloned()
                        .unwrap_or_else(|| matched.to_string())
                })
                .into_owned(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    literals = literals.len(),
                    "Literal alternation too large, scanning literals directly"
                );
                scan_literals(content, &literals, &replacements)
            }
        }
    }
}

/// Leftmost, first-listed match at each position, in one pass
///
/// `literals` are sorted longest first, so this agrees with the
/// alternation regex.
fn scan_literals(content: &str, literals: &[&str], replacements: &HashMap<&str, String>) -> String {
    let mut masked = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(c) = rest.chars().next() {
        let hit = literals
            .iter()
            .find(|l| rest.starts_with(**l))
            .and_then(|l| replacements.get(*l).map(|r| (l.len(), r)));
        match hit {
            Some((len, replacement)) => {
                masked.push_str(replacement);
                rest = &rest[len..];
            }
            None => {
                masked.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    masked
}
