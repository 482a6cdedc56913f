//! A small facade over `serde_json`: pretty or compact output, a field naming
//! policy applied to object keys, and a date format for `chrono` timestamps.
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write;
use std::str::FromStr;
use thiserror::Error;

/// Errors from the JSON facade
#[derive(Debug, Error)]
pub enum JsonError {
    /// Serializing, deserializing or parsing failed
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// A date didn't match the configured format
    #[error("date {text:?} doesn't match format {format:?}")]
    Date {
        /// The text that failed to parse
        text: String,
        /// The format it was checked against
        format: String,
        /// What `chrono` said about it
        #[source]
        source: chrono::ParseError,
    },
    /// The date format can't be used to write a date
    #[error("invalid date format {format:?}")]
    DateFormat {
        /// The offending format
        format: String,
    },
}

/// How object keys are spelled in serialized output. Keys may be written in
/// `snake_case`, `kebab-case` or `camelCase` form on the Rust side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldNaming {
    /// Keys as they are
    #[default]
    Identity,
    /// `fieldName`
    LowerCamelCase,
    /// `FieldName`
    UpperCamelCase,
    /// `field_name`
    LowerCaseWithUnderscores,
    /// `field-name`
    LowerCaseWithDashes,
}

impl FieldNaming {
    /// Respells `key` according to this policy.
    #[must_use]
    pub fn apply(self, key: &str) -> String {
        let words = words_of(key);
        match self {
            FieldNaming::Identity => key.to_string(),
            FieldNaming::LowerCamelCase => {
                let mut out = String::with_capacity(key.len());
                for (i, word) in words.iter().enumerate() {
                    if i == 0 {
                        out.push_str(word);
                    } else {
                        out.push_str(&capitalize(word));
                    }
                }
                out
            }
            FieldNaming::UpperCamelCase => words.iter().map(|w| capitalize(w)).collect(),
            FieldNaming::LowerCaseWithUnderscores => words.join("_"),
            FieldNaming::LowerCaseWithDashes => words.join("-"),
        }
    }
}

impl FromStr for FieldNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(FieldNaming::Identity),
            "lower-camel" => Ok(FieldNaming::LowerCamelCase),
            "upper-camel" => Ok(FieldNaming::UpperCamelCase),
            "lower-underscores" => Ok(FieldNaming::LowerCaseWithUnderscores),
            "lower-dashes" => Ok(FieldNaming::LowerCaseWithDashes),
            _ => Err(format!(
                "unknown field naming {s:?}; expected identity, lower-camel, upper-camel, \
                 lower-underscores or lower-dashes"
            )),
        }
    }
}

/// Splits `key` into lower case words at `_`, `-` and lower-to-upper case
/// changes.
fn words_of(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in key.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The default for `JsonFacade::date_format`
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Rejects a `chrono` format string containing an unknown specifier.
pub fn check_date_format(format: &str) -> Result<(), JsonError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(JsonError::DateFormat { format: format.to_string() });
    }
    Ok(())
}

/// Serializes and parses JSON according to a fixed policy. Build one with
/// `JsonFacade::builder()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFacade {
    pretty: bool,
    field_naming: FieldNaming,
    date_format: String,
}

impl Default for JsonFacade {
    fn default() -> Self {
        JsonFacade::builder().build()
    }
}

/// Builder for `JsonFacade`
#[derive(Debug, Clone)]
pub struct JsonFacadeBuilder {
    facade: JsonFacade,
}

impl JsonFacadeBuilder {
    /// Pretty-print (the default) or not.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.facade.pretty = pretty;
        self
    }
    /// Respell object keys with `naming`.
    #[must_use]
    pub fn field_naming(mut self, naming: FieldNaming) -> Self {
        self.facade.field_naming = naming;
        self
    }
    /// `chrono` format string for `format_date` and `parse_date`.
    #[must_use]
    pub fn date_format(mut self, format: &str) -> Self {
        self.facade.date_format = format.to_string();
        self
    }
    /// The finished facade
    #[must_use]
    pub fn build(self) -> JsonFacade {
        self.facade
    }
}

impl JsonFacade {
    /// A builder with defaults: pretty output, keys unchanged, and
    /// `DEFAULT_DATE_FORMAT`.
    #[must_use]
    pub fn builder() -> JsonFacadeBuilder {
        JsonFacadeBuilder {
            facade: JsonFacade {
                pretty: true,
                field_naming: FieldNaming::Identity,
                date_format: DEFAULT_DATE_FORMAT.to_string(),
            },
        }
    }

    /// Does this facade pretty-print?
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Serializes `value`, pretty or compact according to the policy, with
    /// object keys respelled by the field naming policy.
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, JsonError> {
        let tree = self.to_tree(value)?;
        self.render(&tree)
    }

    /// Like `to_json`, but always pretty-printed.
    pub fn to_pretty_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(&self.to_tree(value)?)?)
    }

    /// Like `to_json`, but always compact.
    pub fn to_compact_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&self.to_tree(value)?)?)
    }

    /// Re-renders JSON `text` pretty or compact. Keys are left alone: they
    /// aren't ours to rename.
    pub fn reformat(&self, text: &str) -> Result<String, JsonError> {
        self.render(&self.parse(text)?)
    }

    /// Parses `text` into a tree.
    pub fn parse(&self, text: &str) -> Result<Value, JsonError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses `text` into a `T`.
    pub fn from_json<T: DeserializeOwned>(&self, text: &str) -> Result<T, JsonError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Formats `date` with the configured date format. Fails if the format
    /// has an unknown specifier, or one a date without a time zone can't
    /// supply (such as `%z`).
    pub fn format_date(&self, date: &NaiveDateTime) -> Result<String, JsonError> {
        check_date_format(&self.date_format)?;
        let mut text = String::new();
        write!(text, "{}", date.format(&self.date_format))
            .map_err(|_| JsonError::DateFormat { format: self.date_format.clone() })?;
        Ok(text)
    }

    /// Parses `text` with the configured date format.
    pub fn parse_date(&self, text: &str) -> Result<NaiveDateTime, JsonError> {
        NaiveDateTime::parse_from_str(text, &self.date_format).map_err(|source| JsonError::Date {
            text: text.to_string(),
            format: self.date_format.clone(),
            source,
        })
    }

    fn to_tree<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, JsonError> {
        let tree = serde_json::to_value(value)?;
        Ok(match self.field_naming {
            FieldNaming::Identity => tree,
            naming => rename_keys(tree, naming),
        })
    }

    fn render(&self, tree: &Value) -> Result<String, JsonError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(tree)?
        } else {
            serde_json::to_string(tree)?
        };
        Ok(text)
    }
}

fn rename_keys(tree: Value, naming: FieldNaming) -> Value {
    match tree {
        Value::Object(map) => {
            let renamed: Map<String, Value> =
                map.into_iter().map(|(k, v)| (naming.apply(&k), rename_keys(v, naming))).collect();
            Value::Object(renamed)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rename_keys(v, naming)).collect())
        }
        other => other,
    }
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        first_name: String,
        item_count: u32,
        nested_things: Vec<Inner>,
    }
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Inner {
        is_ok: bool,
    }

    fn record() -> Record {
        Record {
            first_name: "Ada".into(),
            item_count: 2,
            nested_things: vec![Inner { is_ok: true }],
        }
    }

    #[test]
    fn naming_policies() {
        assert_eq!(FieldNaming::Identity.apply("first_name"), "first_name");
        assert_eq!(FieldNaming::LowerCamelCase.apply("first_name"), "firstName");
        assert_eq!(FieldNaming::UpperCamelCase.apply("first_name"), "FirstName");
        assert_eq!(FieldNaming::LowerCaseWithUnderscores.apply("firstName"), "first_name");
        assert_eq!(FieldNaming::LowerCaseWithDashes.apply("firstName"), "first-name");
        assert_eq!(FieldNaming::LowerCamelCase.apply("generated_at"), "generatedAt");
        assert_eq!(FieldNaming::LowerCaseWithDashes.apply("item2_count"), "item2-count");
    }

    #[test]
    fn naming_parses_from_config_spelling() {
        assert_eq!("lower-camel".parse::<FieldNaming>(), Ok(FieldNaming::LowerCamelCase));
        assert!("shouty".parse::<FieldNaming>().is_err());
    }

    #[test]
    fn compact_output_renames_nested_keys() {
        let facade =
            JsonFacade::builder().pretty(false).field_naming(FieldNaming::LowerCamelCase).build();
        assert_eq!(
            facade.to_json(&record()).unwrap(),
            r#"{"firstName":"Ada","itemCount":2,"nestedThings":[{"isOk":true}]}"#
        );
    }

    #[test]
    fn pretty_output_spans_lines() {
        let facade = JsonFacade::default();
        let text = facade.to_json(&record()).unwrap();
        assert!(text.contains("\n  \"first_name\": \"Ada\""), "{text}");
        assert_eq!(facade.to_compact_json(&json!([1, 2])).unwrap(), "[1,2]");
        assert_eq!(facade.to_pretty_json(&json!([])).unwrap(), "[]");
    }

    #[test]
    fn reformat_and_parse() {
        let compact = JsonFacade::builder().pretty(false).build();
        assert_eq!(compact.reformat("{ \"a_b\" : [ 1 , 2 ] }").unwrap(), r#"{"a_b":[1,2]}"#);
        assert_eq!(compact.parse("[true]").unwrap(), json!([true]));
        assert!(matches!(compact.parse("[tru"), Err(JsonError::Serde(_))));
    }

    #[test]
    fn typed_round_trip_through_identity_naming() {
        let facade = JsonFacade::default();
        let text = facade.to_json(&record()).unwrap();
        assert_eq!(facade.from_json::<Record>(&text).unwrap(), record());
    }

    #[test]
    fn dates_use_the_configured_format() {
        let when = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(13, 5, 0).unwrap();
        let facade = JsonFacade::builder().date_format("%d/%m/%Y %H:%M").build();
        assert_eq!(facade.format_date(&when).unwrap(), "29/02/2024 13:05");
        assert_eq!(facade.parse_date("29/02/2024 13:05").unwrap(), when);
        assert!(matches!(facade.parse_date("2024-02-29"), Err(JsonError::Date { .. })));
        assert_eq!(JsonFacade::default().format_date(&when).unwrap(), "2024-02-29T13:05:00");
    }

    #[test]
    fn unusable_date_formats_are_errors_not_panics() {
        let when = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(13, 5, 0).unwrap();
        assert!(matches!(check_date_format("%Q"), Err(JsonError::DateFormat { .. })));
        assert!(check_date_format("%Y-%m-%d %z").is_ok());

        let unknown = JsonFacade::builder().date_format("%Q").build();
        assert!(matches!(unknown.format_date(&when), Err(JsonError::DateFormat { .. })));
        let zoned = JsonFacade::builder().date_format("%Y %z").build();
        assert!(matches!(zoned.format_date(&when), Err(JsonError::DateFormat { .. })));
    }
}
