//! Redaction policies per category

use crate::domain::PiiCategory;
use regex::Captures;

/// Administrative-division suffixes kept when redacting an address
const ADMIN_LABELS: [char; 10] = ['시', '도', '군', '구', '동', '읍', '면', '리', '로', '길'];

/// Token used for literals without a category-specific shape
pub const DEFAULT_TOKEN: &str = "****";

/// How a detected value is replaced
///
/// Every output consists only of `*`, separators and the parts of the
/// input a policy deliberately keeps (phone prefix, e-mail domain, first
/// syllable, administrative labels), so masked text matches no rule again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactionPolicy {
    /// Replace the whole value with a fixed token
    Fixed(&'static str),
    /// Keep the carrier prefix (first capture group)
    PhonePrefix,
    /// Keep the domain after `@`
    EmailDomain,
    /// Keep the first character of a name
    KeepFirstChar,
    /// Keep administrative labels such as 시/구/동
    KeepAdminLabels,
}

impl RedactionPolicy {
    /// Policy for a category
    pub fn for_category(category: &PiiCategory) -> Self {
        match category {
            PiiCategory::NationalId => Self::Fixed("******-*******"),
            PiiCategory::Phone => Self::PhonePrefix,
            PiiCategory::BirthDate => Self::Fixed("****-**-**"),
            PiiCategory::BankAccount => Self::Fixed("****-****-****"),
            PiiCategory::Passport => Self::Fixed("********"),
            PiiCategory::Email => Self::EmailDomain,
            PiiCategory::CardNumber => Self::Fixed("****-****-****-****"),
            PiiCategory::PersonName => Self::KeepFirstChar,
            PiiCategory::Address => Self::KeepAdminLabels,
            PiiCategory::Additional(_) => Self::Fixed(DEFAULT_TOKEN),
        }
    }

    /// Replacement for a regex match of a category rule
    pub fn redact_match(&self, caps: &Captures<'_>) -> String {
        let matched = caps.get(0).map_or("", |m| m.as_str());
        match self {
            Self::PhonePrefix => {
                let prefix = caps
                    .get(1)
                    .map(|m| m.as_str())
                    .or_else(|| matched.split('-').next())
                    .unwrap_or("");
                if prefix.is_empty() || prefix == matched {
                    "***-****-****".to_string()
                } else {
                    format!("{prefix}-****-****")
                }
            }
            Self::EmailDomain => {
                let domain = caps
                    .get(1)
                    .map(|m| m.as_str())
                    .or_else(|| matched.rsplit_once('@').map(|(_, d)| d))
                    .unwrap_or("");
                format!("******@{domain}")
            }
            _ => self.redact(matched),
        }
    }

    /// Replacement for a literal reported by a detector
    ///
    /// Literals only keep a shape for names and addresses; everything else
    /// becomes [`DEFAULT_TOKEN`].
    pub fn redact_literal(&self, literal: &str) -> String {
        match self {
            Self::KeepFirstChar | Self::KeepAdminLabels => self.redact(literal),
            _ => DEFAULT_TOKEN.to_string(),
        }
    }

    fn redact(&self, value: &str) -> String {
        match self {
            Self::Fixed(token) => (*token).to_string(),
            Self::KeepFirstChar => redact_name(value),
            Self::KeepAdminLabels => redact_address(value),
            Self::PhonePrefix | Self::EmailDomain => DEFAULT_TOKEN.to_string(),
        }
    }
}

fn redact_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let rest = chars.count();
            if rest == 0 {
                "*".to_string()
            } else {
                std::iter::once(first)
                    .chain(std::iter::repeat('*').take(rest))
                    .collect()
            }
        }
    }
}

fn redact_address(address: &str) -> String {
    address
        .split(' ')
        .map(|token| {
            let count = token.chars().count();
            match token.chars().last() {
                Some(last) if count > 1 && ADMIN_LABELS.contains(&last) => {
                    let mut out: String = "*".repeat(count - 1);
                    out.push(last);
                    out
                }
                _ => "*".repeat(count),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
