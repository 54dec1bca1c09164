//! Field definitions for generated records.
//!
//! A [`FieldSpec`] fixes the shape of every record in a run: which numeric
//! fields exist, which string fields exist, and the order both are emitted in.
//! Numeric fields always come first, then string fields, each group in
//! declaration order.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;

/// Number of string fields in the default generic field set.
pub const DEFAULT_GENERIC_STRINGS: usize = 29;

/// Number of numeric fields in the default generic field set.
pub const DEFAULT_GENERIC_NUMBERS: usize = 28;

/// A named string field with an optional label prepended to every value.
///
/// With a prefix `Loc` and a drawn value `X` the emitted value is `"Loc X"`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StringField {
    pub name: String,

    #[serde(default)]
    pub prefix: Option<String>,
}

impl StringField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
        }
    }

    pub fn with_prefix(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: Some(prefix.into()),
        }
    }
}

/// Counts for the generic `Dimension{n}` / `Measure{n}` field set.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct GenericFields {
    #[serde(default)]
    pub strings: usize,

    #[serde(default)]
    pub numbers: usize,
}

/// Raw `fields:` section as written in YAML.
///
/// Either the explicit lists or the `generic` block may be given, never both.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldsSection {
    #[serde(default)]
    numbers: Vec<String>,

    #[serde(default)]
    strings: Vec<StringField>,

    #[serde(default)]
    generic: Option<GenericFields>,
}

/// Ordered field layout of a generated record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "FieldsSection")]
pub struct FieldSpec {
    numbers: Vec<String>,
    strings: Vec<StringField>,
}

impl FieldSpec {
    /// Create a field spec from explicit numeric and string fields.
    pub fn new(numbers: Vec<String>, strings: Vec<StringField>) -> Self {
        Self { numbers, strings }
    }

    /// Create the generic field set: `Measure1..=numbers` and `Dimension1..=strings`.
    pub fn generic(strings: usize, numbers: usize) -> Self {
        Self {
            numbers: (1..=numbers).map(|i| format!("Measure{i}")).collect(),
            strings: (1..=strings)
                .map(|i| StringField::new(format!("Dimension{i}")))
                .collect(),
        }
    }

    pub fn number_fields(&self) -> &[String] {
        &self.numbers
    }

    pub fn string_fields(&self) -> &[StringField] {
        &self.strings
    }

    /// Total number of keys in a record body.
    pub fn field_count(&self) -> usize {
        self.numbers.len() + self.strings.len()
    }

    /// String field names, used to build the index mapping.
    pub fn string_field_names(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|f| f.name.as_str())
    }

    /// All field names in emission order.
    pub fn field_names(&self) -> Vec<&str> {
        self.numbers
            .iter()
            .map(String::as_str)
            .chain(self.string_field_names())
            .collect()
    }

    /// Check that the field set is non-empty and every name is non-empty and unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_count() == 0 {
            return Err(ConfigError::invalid(
                "fields",
                "at least one numeric or string field is required",
            ));
        }

        let mut seen = HashSet::new();
        for name in self.field_names() {
            if name.is_empty() {
                return Err(ConfigError::invalid("fields", "field names must not be empty"));
            }
            check_json_name("fields", name)?;
            if !seen.insert(name) {
                return Err(ConfigError::invalid(
                    "fields",
                    format!("duplicate field name '{name}'"),
                ));
            }
        }

        Ok(())
    }
}

/// Names are written into the bulk JSON unescaped, so they must not contain
/// a quote, a backslash or a control character.
pub(crate) fn check_json_name(field: &str, name: &str) -> Result<(), ConfigError> {
    match name.chars().find(|c| *c == '"' || *c == '\\' || c.is_control()) {
        Some(c) => Err(ConfigError::invalid(
            field,
            format!("{name:?} contains {c:?}, which is not allowed in a name"),
        )),
        None => Ok(()),
    }
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self::generic(DEFAULT_GENERIC_STRINGS, DEFAULT_GENERIC_NUMBERS)
    }
}

impl TryFrom<FieldsSection> for FieldSpec {
    type Error = ConfigError;

    fn try_from(section: FieldsSection) -> Result<Self, Self::Error> {
        let explicit = !section.numbers.is_empty() || !section.strings.is_empty();

        match (section.generic, explicit) {
            (Some(_), true) => Err(ConfigError::invalid(
                "fields",
                "'generic' cannot be combined with 'numbers' or 'strings'",
            )),
            (Some(generic), false) => Ok(Self::generic(generic.strings, generic.numbers)),
            (None, _) => Ok(Self::new(section.numbers, section.strings)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_fields() {
        let spec = FieldSpec::generic(2, 3);

        assert_eq!(spec.field_count(), 5);
        assert_eq!(
            spec.field_names(),
            vec!["Measure1", "Measure2", "Measure3", "Dimension1", "Dimension2"]
        );
        assert!(spec.string_fields().iter().all(|f| f.prefix.is_none()));
    }

    #[test]
    fn test_explicit_fields_keep_declared_order() {
        let yaml = r#"
numbers: [currentprice, suggestedprice]
strings:
  - name: zonename
    prefix: Zone
  - name: channel
  - name: brand
    prefix: brand
"#;
        let spec: FieldSpec = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            spec.field_names(),
            vec!["currentprice", "suggestedprice", "zonename", "channel", "brand"]
        );
        assert_eq!(spec.string_fields()[0].prefix.as_deref(), Some("Zone"));
        assert_eq!(spec.string_fields()[1].prefix, None);
        assert_eq!(
            spec.string_field_names().collect::<Vec<_>>(),
            vec!["zonename", "channel", "brand"]
        );
    }

    #[test]
    fn test_generic_section() {
        let spec: FieldSpec = serde_yaml::from_str("generic: { strings: 1, numbers: 2 }").unwrap();
        assert_eq!(spec, FieldSpec::generic(1, 2));
    }

    #[test]
    fn test_generic_and_explicit_rejected() {
        let yaml = "numbers: [price]\ngeneric: { strings: 1, numbers: 1 }";
        let result: Result<FieldSpec, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let spec = FieldSpec::new(
            vec!["price".to_string()],
            vec![StringField::new("price")],
        );
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "fields"
        ));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(FieldSpec::new(vec![], vec![]).validate().is_err());
        assert!(FieldSpec::new(vec![String::new()], vec![]).validate().is_err());
        assert!(FieldSpec::new(vec!["a\"b".to_string()], vec![]).validate().is_err());
        assert!(FieldSpec::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_names_needing_escapes() {
        for name in ["a\nb", "tab\there", "back\\slash", "quo\"te", "bell\u{7}"] {
            let numeric = FieldSpec::new(vec![name.to_string()], vec![]);
            assert!(numeric.validate().is_err(), "numeric field {name:?}");

            let string = FieldSpec::new(vec![], vec![StringField::with_prefix(name, "ok")]);
            assert!(string.validate().is_err(), "string field {name:?}");
        }

        // Prefixes are escaped with the value, so anything goes there.
        let prefixed = FieldSpec::new(vec![], vec![StringField::with_prefix("zone", "a\"b\n")]);
        assert!(prefixed.validate().is_ok());
        assert!(FieldSpec::default().validate().is_ok());
    }
}
