use serde::Serialize;

use super::cast::{cast_float, cast_int, cast_int_from_float, remove_quotes};
use crate::error::M3u8Result;

/// How the value of a named attribute is converted after tokenizing.
///
/// Attributes without an entry in the caster table only get one layer of
/// matching quotes stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    Integer,
    /// Some encoders write integral attributes such as `BANDWIDTH` as decimals.
    IntegerFromFloat,
    Float,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(u64),
    Float(f64),
}

/// Ordered `NAME=VALUE` pairs of an attribute-list tag.
///
/// Names are normalized with [`normalize_attribute`], so `GROUP-ID` is stored as `group_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeList(Vec<(String, AttributeValue)>);

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            AttributeValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            AttributeValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            AttributeValue::Float(value) => Some(*value),
            AttributeValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, value: AttributeValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, old)) => *old = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn remove_str(&mut self, name: &str) -> Option<String> {
        match self.remove(name)? {
            AttributeValue::String(value) => Some(value),
            AttributeValue::Integer(value) => Some(value.to_string()),
            AttributeValue::Float(value) => Some(value.to_string()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// `GROUP-ID` -> `group_id`
pub fn normalize_attribute(attribute: &str) -> String {
    attribute.replace('-', "_").to_lowercase().trim().to_string()
}

/// `group_id` -> `GROUP-ID`
pub fn denormalize_attribute(attribute: &str) -> String {
    attribute.replace('_', "-").to_uppercase()
}

/// Splits an attribute list on commas which are not enclosed in single or double quotes.
///
/// Empty items between consecutive commas are dropped.
pub fn split_attribute_list(input: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ',') => {
                if index > start {
                    items.push(&input[start..index]);
                }
                start = index + 1;
            }
            (None, _) => {}
        }
    }
    if start < input.len() {
        items.push(&input[start..]);
    }

    items
}

/// Tokenizes the attribute list following `prefix:` in `line`.
///
/// Each item is split on its first `=`, the name is normalized and the value is
/// converted according to `casts`. Items without `=` are skipped.
pub fn parse_attribute_list(
    prefix: &str,
    line: &str,
    casts: &[(&str, Cast)],
) -> M3u8Result<AttributeList> {
    let params = line
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or_default();

    let mut attributes = AttributeList::new();
    for param in split_attribute_list(params) {
        let Some((name, value)) = param.split_once('=') else {
            log::warn!("Ignored attribute without value in {prefix}: {param}");
            continue;
        };
        let name = normalize_attribute(name);
        let value = value.trim();

        let value = match casts.iter().find(|(key, _)| *key == name) {
            Some((_, Cast::Integer)) => AttributeValue::Integer(cast_int(value)?),
            Some((_, Cast::IntegerFromFloat)) => {
                AttributeValue::Integer(cast_int_from_float(value)?)
            }
            Some((_, Cast::Float)) => AttributeValue::Float(cast_float(value)?),
            None => AttributeValue::String(remove_quotes(value).to_string()),
        };
        attributes.insert(name, value);
    }

    Ok(attributes)
}
