//! PII categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a detected personal-information value
///
/// The set is fixed except for [`PiiCategory::Additional`], whose label is
/// supplied by the caller (e.g. "project name") when asking the external
/// detector for extra information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PiiCategory {
    /// Resident registration number
    NationalId,
    /// Postal address
    Address,
    /// Mobile phone number
    Phone,
    /// Date of birth
    BirthDate,
    /// Bank account number
    BankAccount,
    /// Passport number
    Passport,
    /// Email address
    Email,
    /// Payment card number
    CardNumber,
    /// Person name
    PersonName,
    /// Caller-defined category
    Additional(String),
}

impl PiiCategory {
    /// Every fixed category, in catalog order
    pub const FIXED: [PiiCategory; 9] = [
        PiiCategory::NationalId,
        PiiCategory::Address,
        PiiCategory::Phone,
        PiiCategory::BirthDate,
        PiiCategory::BankAccount,
        PiiCategory::Passport,
        PiiCategory::Email,
        PiiCategory::CardNumber,
        PiiCategory::PersonName,
    ];

    /// Stable key used in pattern libraries, reports and persisted records
    pub fn key(&self) -> &str {
        match self {
            Self::NationalId => "national-id",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::BirthDate => "birth-date",
            Self::BankAccount => "bank-account",
            Self::Passport => "passport",
            Self::Email => "email",
            Self::CardNumber => "card-number",
            Self::PersonName => "person-name",
            Self::Additional(label) => label,
        }
    }

    /// Resolve a fixed category from a key or one of the labels the
    /// external detector is known to answer with.
    ///
    /// Returns `None` for anything else; such labels are caller-defined.
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = key.trim().to_lowercase().replace(['_', ' '], "-");
        let category = match normalized.as_str() {
            "national-id" | "resident-number" | "resident-registration-number" | "ssn"
            | "주민등록번호" => Self::NationalId,
            "address" | "addresses" | "주소" => Self::Address,
            "phone" | "phone-number" | "contact" | "연락처" | "전화번호" => Self::Phone,
            "birth-date" | "date-of-birth" | "birthday" | "생년월일" => Self::BirthDate,
            "bank-account" | "account-number" | "account" | "계좌번호" => Self::BankAccount,
            "passport" | "passport-number" | "여권번호" => Self::Passport,
            "email" | "e-mail" | "이메일" => Self::Email,
            "card-number" | "credit-card" | "card" | "카드번호" => Self::CardNumber,
            "person-name" | "name" | "names" | "이름" | "성명" => Self::PersonName,
            _ => return None,
        };
        Some(category)
    }
}

impl From<String> for PiiCategory {
    fn from(value: String) -> Self {
        Self::from_key(&value).unwrap_or(Self::Additional(value))
    }
}

impl From<PiiCategory> for String {
    fn from(category: PiiCategory) -> Self {
        category.key().to_string()
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
