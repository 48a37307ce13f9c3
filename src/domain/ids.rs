//! Domain identifier types with validation
//!
//! Newtype wrappers for the two identifiers every request carries: the
//! entity type of a detection and the language tag of the text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity type newtype wrapper
///
/// Identifies a category of PII such as `PERSON` or `EMAIL_ADDRESS`.
/// Values are trimmed; the case is kept as given because recognizer
/// libraries use mixed-case names like `PHONES_el`.
///
/// # Examples
///
/// ```
/// use veil::domain::ids::EntityType;
/// use std::str::FromStr;
///
/// let entity = EntityType::from_str(" EMAIL_ADDRESS ").unwrap();
/// assert_eq!(entity.as_str(), "EMAIL_ADDRESS");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityType(String);

impl EntityType {
    /// Creates a new EntityType from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(EntityType)` if the name is valid, `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err("Entity type cannot be empty".to_string());
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!(
                "Entity type '{trimmed}' may only contain ASCII letters, digits, '_' and '-'"
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the entity type as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        value.0
    }
}

impl AsRef<str> for EntityType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Language code newtype wrapper
///
/// A short language tag such as `en` or `el`. Stored lower-cased so that
/// `EN` and `en` select the same recognizers.
///
/// # Examples
///
/// ```
/// use veil::domain::ids::LanguageCode;
///
/// let lang = LanguageCode::new("EL").unwrap();
/// assert_eq!(lang.as_str(), "el");
/// assert!(LanguageCode::new("e1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Creates a new LanguageCode from a string
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        let code = code.trim().to_lowercase();
        if code.len() < 2 || code.len() > 8 {
            return Err(format!(
                "Language code '{code}' must be between 2 and 8 characters"
            ));
        }
        if !code.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
            return Err(format!(
                "Language code '{code}' may only contain ASCII letters and '-'"
            ));
        }
        Ok(Self(code))
    }

    /// Returns the language code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_creation() {
        let entity = EntityType::new("PHONES_el").unwrap();
        assert_eq!(entity.as_str(), "PHONES_el");
    }

    #[test]
    fn test_entity_type_empty_fails() {
        assert!(EntityType::new("").is_err());
        assert!(EntityType::new("   ").is_err());
    }

    #[test]
    fn test_entity_type_rejects_spaces() {
        assert!(EntityType::new("CREDIT CARD").is_err());
    }

    #[test]
    fn test_entity_type_display() {
        let entity = EntityType::new("IBAN_CODE").unwrap();
        assert_eq!(format!("{entity}"), "IBAN_CODE");
    }

    #[test]
    fn test_language_code_lowercases() {
        let lang = LanguageCode::from_str("En").unwrap();
        assert_eq!(lang.as_str(), "en");
    }

    #[test]
    fn test_language_code_invalid() {
        assert!(LanguageCode::new("e").is_err());
        assert!(LanguageCode::new("english-language").is_err());
        assert!(LanguageCode::new("e1").is_err());
    }

    #[test]
    fn test_language_code_region_tag() {
        assert_eq!(LanguageCode::new("pt-br").unwrap().as_str(), "pt-br");
    }

    #[test]
    fn test_ids_serialization() {
        let entity = EntityType::new("PERSON").unwrap();
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, "\"PERSON\"");

        let lang: LanguageCode = serde_json::from_str("\"EL\"").unwrap();
        assert_eq!(lang.as_str(), "el");

        let bad: Result<EntityType, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
