//! Operator rules: how each entity type is rewritten
//!
//! An [`OperatorTable`] maps entity types to an [`OperatorRule`]. Two preset
//! tables ship with the crate: `redact` replaces PII with markers such as
//! `HIDDEN_EMAIL`, `synthetic` replaces it with plausible dummy values.
//! Configuration can override or add rules in either preset.

pub mod generator;
pub mod mask;

use crate::anonymization::config::{OperatorRuleConfig, OperatorsConfig};
use crate::anonymization::models::OperatorPreset;
use crate::domain::{EntityType, Result, VeilError};
use rand::RngCore;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use generator::{DigitsGenerator, IbanGenerator, ListGenerator, ValueGenerator};

/// Transformation applied to one span
#[derive(Debug, Clone)]
pub enum OperatorRule {
    /// Replace with a literal value
    Replace { new_value: String },
    /// Replace with a generated value, once per occurrence
    Generate { generator: Arc<dyn ValueGenerator> },
    /// Replace characters with `masking_char`
    Mask {
        masking_char: char,
        chars_to_mask: usize,
        from_end: bool,
    },
}

impl OperatorRule {
    /// Literal replacement
    pub fn replace(new_value: impl Into<String>) -> Self {
        Self::Replace {
            new_value: new_value.into(),
        }
    }

    /// Masking rule
    pub fn mask(masking_char: char, chars_to_mask: usize, from_end: bool) -> Self {
        Self::Mask {
            masking_char,
            chars_to_mask,
            from_end,
        }
    }

    /// Generated replacement
    pub fn generate(generator: impl ValueGenerator + 'static) -> Self {
        Self::Generate {
            generator: Arc::new(generator),
        }
    }

    /// Produce the replacement for `original`
    pub fn apply(&self, original: &str, rng: &mut dyn RngCore) -> String {
        match self {
            Self::Replace { new_value } => new_value.clone(),
            Self::Generate { generator } => generator.generate(original, rng),
            Self::Mask {
                masking_char,
                chars_to_mask,
                from_end,
            } => mask::mask(original, *masking_char, *chars_to_mask, *from_end),
        }
    }

    /// Operator name for logs and audit records
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::Generate { .. } => "generate",
            Self::Mask { .. } => "mask",
        }
    }

    fn from_config(entity: &str, config: &OperatorRuleConfig) -> Result<Self> {
        Ok(match config {
            OperatorRuleConfig::Replace { new_value } => Self::replace(new_value.as_str()),
            OperatorRuleConfig::Mask {
                masking_char,
                chars_to_mask,
                from_end,
            } => Self::mask(*masking_char, *chars_to_mask, *from_end),
            OperatorRuleConfig::Generate { generator, values } => match generator.as_str() {
                "iban" => Self::generate(IbanGenerator),
                "digits" => Self::generate(DigitsGenerator),
                "list" => Self::generate(ListGenerator::new(values.clone()).ok_or_else(|| {
                    VeilError::Configuration(format!(
                        "Operator for '{entity}': list generator needs values"
                    ))
                })?),
                other => {
                    return Err(VeilError::Configuration(format!(
                        "Operator for '{entity}': unknown generator '{other}'"
                    )))
                }
            },
        })
    }
}

/// Entity type to operator rule mapping
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    rules: BTreeMap<EntityType, OperatorRule>,
}

impl OperatorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rule for an entity type, replacing any existing one
    pub fn insert(&mut self, entity: EntityType, rule: OperatorRule) {
        self.rules.insert(entity, rule);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_rule(mut self, entity: EntityType, rule: OperatorRule) -> Self {
        self.insert(entity, rule);
        self
    }

    /// Rule for an entity type
    pub fn get(&self, entity: &EntityType) -> Option<&OperatorRule> {
        self.rules.get(entity)
    }

    /// Whether the table has a rule for `entity`
    pub fn contains(&self, entity: &EntityType) -> bool {
        self.rules.contains_key(entity)
    }

    /// Fail with `MissingOperatorRule` for the first entity without a rule
    pub fn ensure_covers<'a>(&self, entities: impl IntoIterator<Item = &'a EntityType>) -> Result<()> {
        for entity in entities {
            if !self.contains(entity) {
                return Err(VeilError::MissingOperatorRule {
                    entity_type: entity.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Entity types with a rule
    pub fn entities(&self) -> impl Iterator<Item = &EntityType> {
        self.rules.keys()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The built-in table for a preset
    pub fn preset(preset: OperatorPreset) -> Self {
        let rules: Vec<(&str, OperatorRule)> = match preset {
            OperatorPreset::Redact => vec![
                ("PERSON", OperatorRule::replace("ANONYMOUS")),
                ("PHONES_en", OperatorRule::replace("HIDDEN_PHONE_NUMBER")),
                ("PHONES_el", OperatorRule::replace("HIDDEN_PHONE_NUMBER")),
                ("PHONE_NUMBER", OperatorRule::replace("HIDDEN_PHONE_NUMBER")),
                ("IP_ADDRESS", OperatorRule::mask('*', 5, true)),
                ("LONG_NUMBERS_en", OperatorRule::replace("HIDDEN_LONG_NUMBER")),
                ("LONG_NUMBERS_el", OperatorRule::replace("HIDDEN_LONG_NUMBER")),
                ("LOCATION", OperatorRule::replace("HIDDEN_LOCATION")),
                ("EMAIL_ADDRESS", OperatorRule::replace("HIDDEN_EMAIL")),
                ("DATE_TIME", OperatorRule::replace("HIDDEN_DATE_TIME")),
                ("CREDIT_CARD", OperatorRule::replace("HIDDEN_CREDIT_CARD")),
                ("IBAN_CODE", OperatorRule::replace("HIDDEN_IBAN")),
            ],
            OperatorPreset::Synthetic => vec![
                ("PERSON", OperatorRule::replace("Anonymous")),
                ("PHONES_en", OperatorRule::replace("123456")),
                ("PHONES_el", OperatorRule::replace("123456")),
                ("PHONE_NUMBER", OperatorRule::replace("123456")),
                ("IP_ADDRESS", OperatorRule::replace("127.0.0.1")),
                ("LONG_NUMBERS_en", OperatorRule::replace("0000000000")),
                ("LONG_NUMBERS_el", OperatorRule::replace("0000000000")),
                ("LOCATION", OperatorRule::replace("Generic Location")),
                ("EMAIL_ADDRESS", OperatorRule::replace("example@mail.com")),
                ("DATE_TIME", OperatorRule::replace("HIDDEN Date or Time")),
                ("CREDIT_CARD", OperatorRule::replace("0000 0000 0000 0000")),
                ("IBAN_CODE", OperatorRule::generate(IbanGenerator)),
            ],
        };

        let mut table = Self::new();
        for (name, rule) in rules {
            if let Ok(entity) = EntityType::new(name) {
                table.insert(entity, rule);
            }
        }
        table
    }

    /// The preset table with configured overrides applied
    pub fn from_config(preset: OperatorPreset, config: &OperatorsConfig) -> Result<Self> {
        let overrides = match preset {
            OperatorPreset::Redact => &config.redact,
            OperatorPreset::Synthetic => &config.synthetic,
        };

        let mut table = Self::preset(preset);
        for (name, rule) in overrides {
            let entity = EntityType::new(name.as_str()).map_err(VeilError::Configuration)?;
            table.insert(entity, OperatorRule::from_config(name, rule)?);
        }

        tracing::debug!(preset = %preset, rules = table.len(), "Operator table built");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entity(name: &str) -> EntityType {
        EntityType::new(name).unwrap()
    }

    #[test]
    fn test_presets_cover_default_entities() {
        let defaults: Vec<EntityType> = crate::anonymization::config::DEFAULT_ENTITIES
            .iter()
            .map(|e| entity(e))
            .collect();
        for preset in [OperatorPreset::Redact, OperatorPreset::Synthetic] {
            assert!(OperatorTable::preset(preset).ensure_covers(&defaults).is_ok());
        }
    }

    #[test]
    fn test_redact_rules() {
        let table = OperatorTable::preset(OperatorPreset::Redact);
        let mut rng = StdRng::seed_from_u64(0);

        let person = table.get(&entity("PERSON")).unwrap();
        assert_eq!(person.apply("Alice", &mut rng), "ANONYMOUS");

        let ip = table.get(&entity("IP_ADDRESS")).unwrap();
        assert_eq!(ip.kind(), "mask");
        assert_eq!(ip.apply("192.168.1.1", &mut rng), "192.16*****");
    }

    #[test]
    fn test_synthetic_iban_is_generated() {
        let table = OperatorTable::preset(OperatorPreset::Synthetic);
        let rule = table.get(&entity("IBAN_CODE")).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let value = rule.apply("GR1601101250000000012300695", &mut rng);
        assert_eq!(value.len(), 34);
        assert!(value.ends_with(&"0".repeat(32)));
    }

    #[test]
    fn test_missing_rule() {
        let table = OperatorTable::new().with_rule(entity("PERSON"), OperatorRule::replace("X"));
        let err = table
            .ensure_covers(&[entity("PERSON"), entity("PASSPORT")])
            .unwrap_err();
        match err {
            VeilError::MissingOperatorRule { entity_type } => assert_eq!(entity_type, "PASSPORT"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_config_overrides() {
        let mut config = OperatorsConfig::default();
        config.redact.insert(
            "PERSON".to_string(),
            OperatorRuleConfig::Replace {
                new_value: "<PERSON>".to_string(),
            },
        );
        config.redact.insert(
            "PASSPORT".to_string(),
            OperatorRuleConfig::Mask {
                masking_char: '#',
                chars_to_mask: 4,
                from_end: true,
            },
        );

        let table = OperatorTable::from_config(OperatorPreset::Redact, &config).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            table.get(&entity("PERSON")).unwrap().apply("Alice", &mut rng),
            "<PERSON>"
        );
        assert_eq!(
            table.get(&entity("PASSPORT")).unwrap().apply("AB123456", &mut rng),
            "AB12####"
        );

        let synthetic = OperatorTable::from_config(OperatorPreset::Synthetic, &config).unwrap();
        assert_eq!(
            synthetic.get(&entity("PERSON")).unwrap().apply("Alice", &mut rng),
            "Anonymous"
        );
    }

    #[test]
    fn test_unknown_generator() {
        let mut config = OperatorsConfig::default();
        config.synthetic.insert(
            "PERSON".to_string(),
            OperatorRuleConfig::Generate {
                generator: "faker".to_string(),
                values: Vec::new(),
            },
        );
        assert!(OperatorTable::from_config(OperatorPreset::Synthetic, &config).is_err());
    }
}
