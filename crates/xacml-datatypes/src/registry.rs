//! Datatype registry.
//!
//! A [`DataTypeFactory`] maps identifiers to the built-in datatype
//! singletons. It is built once, from configuration, and read-only after
//! that; [`default_factory`] is the process-wide instance with default
//! settings.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use tracing::{info, warn};
use xacml_config::XacmlConfig;

use crate::attribute::AttributeValue;
use crate::builtin::{
    ANY_URI, BASE64_BINARY, BOOLEAN, DATE, DATE_TIME, DAY_TIME_DURATION, DNS_NAME, DOUBLE,
    HEX_BINARY, INTEGER, IP_ADDRESS, RFC822_NAME, STRING, TIME, YEAR_MONTH_DURATION,
};
use crate::datatype::DynDataType;
use crate::error::{DataTypeError, Result};
use crate::identifiers::{self, Identifier};
use crate::source::{Source, TextNode};
use crate::value::Value;

/// Every built-in datatype, under its XACML 3.0 identifier.
pub static BUILTIN_DATA_TYPES: [&dyn DynDataType; 15] = [
    &STRING,
    &BOOLEAN,
    &INTEGER,
    &DOUBLE,
    &ANY_URI,
    &HEX_BINARY,
    &BASE64_BINARY,
    &DATE,
    &TIME,
    &DATE_TIME,
    &DAY_TIME_DURATION,
    &YEAR_MONTH_DURATION,
    &RFC822_NAME,
    &DNS_NAME,
    &IP_ADDRESS,
];

/// Pre-3.0 identifiers and the datatype each one names.
pub static LEGACY_ALIASES: [(Identifier, &dyn DynDataType); 4] = [
    (identifiers::LEGACY_DAY_TIME_DURATION, &DAY_TIME_DURATION),
    (identifiers::LEGACY_YEAR_MONTH_DURATION, &YEAR_MONTH_DURATION),
    (identifiers::LEGACY_DAY_TIME_DURATION_WD, &DAY_TIME_DURATION),
    (identifiers::LEGACY_YEAR_MONTH_DURATION_WD, &YEAR_MONTH_DURATION),
];

static DEFAULT_FACTORY: LazyLock<DataTypeFactory> = LazyLock::new(DataTypeFactory::new);

/// The registry built from default settings.
pub fn default_factory() -> &'static DataTypeFactory {
    &DEFAULT_FACTORY
}

/// Read-only lookup from identifier to datatype.
#[derive(Debug)]
pub struct DataTypeFactory {
    types: HashMap<Identifier, &'static dyn DynDataType>,
    legacy_identifiers: bool,
    collapse_whitespace: bool,
}

impl Default for DataTypeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTypeFactory {
    /// Builds a factory with every built-in datatype and the legacy aliases.
    pub fn new() -> Self {
        Self::from_config(&XacmlConfig::default())
    }

    /// Builds a factory from the `registry` and `conversion` settings.
    pub fn from_config(config: &XacmlConfig) -> Self {
        let disabled: HashSet<&str> = config.registry.disabled.iter().map(String::as_str).collect();

        for id in &disabled {
            let known = BUILTIN_DATA_TYPES
                .iter()
                .any(|dt| dt.data_type_id().as_str() == *id)
                || LEGACY_ALIASES.iter().any(|(alias, _)| alias.as_str() == *id);
            if !known {
                warn!(data_type = %id, "Disabled data type is not a known identifier");
            }
        }

        let enabled = |dt: &dyn DynDataType| !disabled.contains(dt.data_type_id().as_str());

        let mut types: HashMap<Identifier, &'static dyn DynDataType> = BUILTIN_DATA_TYPES
            .iter()
            .filter(|dt| enabled(**dt))
            .map(|dt| (dt.data_type_id().clone(), *dt))
            .collect();

        if config.registry.legacy_identifiers {
            for (alias, dt) in &LEGACY_ALIASES {
                if enabled(*dt) && !disabled.contains(alias.as_str()) {
                    types.insert(alias.clone(), *dt);
                }
            }
        }

        info!(
            data_types = types.len(),
            legacy_identifiers = config.registry.legacy_identifiers,
            collapse_whitespace = config.conversion.collapse_whitespace,
            "Data type factory built"
        );

        Self {
            types,
            legacy_identifiers: config.registry.legacy_identifiers,
            collapse_whitespace: config.conversion.collapse_whitespace,
        }
    }

    pub fn get(&self, id: &str) -> Option<&'static dyn DynDataType> {
        self.types.get(id).copied()
    }

    pub fn require(&self, id: &str) -> Result<&'static dyn DynDataType> {
        self.get(id)
            .ok_or_else(|| DataTypeError::UnknownDataType(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn legacy_identifiers(&self) -> bool {
        self.legacy_identifiers
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&Identifier> {
        let mut ids: Vec<&Identifier> = self.types.keys().collect();
        ids.sort();
        ids
    }

    /// Converts a source with the datatype registered under `id`.
    pub fn convert(&self, id: &str, source: &Source) -> Result<Value> {
        let data_type = self.require(id)?;
        data_type.convert_value(&self.prepare(data_type, source))
    }

    /// Converts a source and tags it. The value carries the datatype's
    /// current identifier even when looked up by a legacy alias.
    pub fn create_attribute_value(
        &self,
        id: &str,
        source: &Source,
    ) -> Result<AttributeValue<Value>> {
        let data_type = self.require(id)?;
        let category = source.category().cloned();
        data_type.create_value(&self.prepare(data_type, source), category)
    }

    /// Applies XML `whiteSpace=collapse` trimming to textual sources of
    /// non-string datatypes when enabled.
    fn prepare<'s>(&self, data_type: &dyn DynDataType, source: &'s Source) -> Cow<'s, Source> {
        if !self.collapse_whitespace || data_type.data_type_id() == &identifiers::STRING {
            return Cow::Borrowed(source);
        }
        match source.flatten() {
            Source::Text(_) | Source::Node(_) | Source::Sequence(_) => match source.to_text() {
                Some(text) => {
                    let trimmed = trim_xml_whitespace(&text);
                    if trimmed.len() == text.len() {
                        Cow::Borrowed(source)
                    } else {
                        Cow::Owned(Source::Node(TextNode {
                            text: trimmed.to_string(),
                            category: source.category().cloned(),
                        }))
                    }
                }
                None => Cow::Borrowed(source),
            },
            _ => Cow::Borrowed(source),
        }
    }
}

fn trim_xml_whitespace(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_registers_builtins_and_legacy_aliases() {
        let factory = DataTypeFactory::new();
        assert_eq!(factory.len(), 19);
        assert!(factory.legacy_identifiers());
        for dt in &BUILTIN_DATA_TYPES {
            assert!(factory.contains(dt.data_type_id().as_str()));
        }
        let legacy = factory
            .get(identifiers::LEGACY_YEAR_MONTH_DURATION_WD.as_str())
            .unwrap();
        assert_eq!(legacy.data_type_id(), &identifiers::YEAR_MONTH_DURATION);
    }

    #[test]
    fn legacy_identifiers_can_be_turned_off() {
        let mut config = XacmlConfig::default();
        config.registry.legacy_identifiers = false;
        let factory = DataTypeFactory::from_config(&config);
        assert_eq!(factory.len(), 15);
        assert!(!factory.contains(identifiers::LEGACY_DAY_TIME_DURATION.as_str()));
    }

    #[test]
    fn disabled_types_are_left_out() {
        let mut config = XacmlConfig::default();
        config.registry.disabled = vec![
            identifiers::DAY_TIME_DURATION.to_string(),
            "urn:example:unknown".to_string(),
        ];
        let factory = DataTypeFactory::from_config(&config);
        assert!(!factory.contains(identifiers::DAY_TIME_DURATION.as_str()));
        // Aliases of a disabled type go with it.
        assert!(!factory.contains(identifiers::LEGACY_DAY_TIME_DURATION.as_str()));
        assert!(factory.contains(identifiers::LEGACY_YEAR_MONTH_DURATION.as_str()));
    }

    #[test]
    fn unknown_identifier() {
        let err = default_factory().convert("urn:example:nope", &Source::from("x")).unwrap_err();
        assert!(matches!(err, DataTypeError::UnknownDataType(_)));
        assert_eq!(err.kind(), ErrorKind::UnsupportedSource);
    }

    #[test]
    fn identifiers_are_sorted() {
        let factory = DataTypeFactory::new();
        let ids = factory.identifiers();
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn whitespace_is_kept_by_default() {
        let err = default_factory()
            .convert(identifiers::INTEGER.as_str(), &Source::from(" 42\n"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn collapse_whitespace_trims_non_string_sources() {
        let factory = DataTypeFactory::from_config(&XacmlConfig::lenient());
        let value = factory
            .convert(identifiers::INTEGER.as_str(), &Source::from(" 42\n"))
            .unwrap();
        assert_eq!(value, Value::Integer(42));

        let text = factory
            .convert(identifiers::STRING.as_str(), &Source::from(" 42\n"))
            .unwrap();
        assert_eq!(text, Value::String(" 42\n".to_string()));
    }

    #[test]
    fn collapse_keeps_node_category() {
        let factory = DataTypeFactory::from_config(&XacmlConfig::lenient());
        let category = Identifier::new("urn:oasis:names:tc:xacml:3.0:attribute-category:environment");
        let node = TextNode::new("  2014-02-28  ").with_category(category.clone());
        let attr = factory
            .create_attribute_value(identifiers::DATE.as_str(), &Source::Node(node))
            .unwrap();
        assert_eq!(attr.category(), Some(&category));
        assert_eq!(attr.to_string(), "2014-02-28");
    }
}
