//! Loads `.properties` files: `key=value` lines, with `#` and `!` comments,
//! backslash line continuations and backslash escapes.
//!
//! Keys keep the order in which they first appear in the file.
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fs, io};
use thiserror::Error;

use crate::io::{decode_if_utf16, lines_of, strip_bom};

/// Errors from loading or reading a `Properties`
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file (or, for `load_resource`, every candidate file) doesn't exist
    #[error("configuration not found: {}", .path.display())]
    NotFound {
        /// The path we looked for
        path: PathBuf,
    },
    /// Something other than a missing file went wrong reading `path`
    #[error("can't read configuration {}", .path.display())]
    Io {
        /// The file being read
        path: PathBuf,
        /// What went wrong
        #[source]
        source: io::Error,
    },
    /// A `\u` escape wasn't followed by four hex digits
    #[error("malformed \\uXXXX escape on line {line}")]
    Malformed {
        /// One-based line number of the logical line's first physical line
        line: usize,
    },
    /// A value couldn't be interpreted as the requested type
    #[error("invalid value {value:?} for key {key:?}: {reason}")]
    InvalidValue {
        /// The key looked up
        key: String,
        /// Its value
        value: String,
        /// Why `value` was rejected
        reason: String,
    },
}

type PropertyMap = IndexMap<String, String, FxBuildHasher>;

/// A key-value view of a `.properties` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    map: PropertyMap,
}

impl Properties {
    /// Loads the properties file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Properties, ConfigError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound { path: path.to_owned() },
            _ => ConfigError::Io { path: path.to_owned(), source },
        })?;
        let props = Properties::parse_bytes(&decode_if_utf16(bytes))?;
        log::debug!("loaded {} properties from {}", props.len(), path.display());
        Ok(props)
    }

    /// Loads the resource `name` from the first of `search_dirs` containing
    /// it. Reports the last candidate tried if no directory has it.
    pub fn load_resource<P: AsRef<Path>>(
        name: &str,
        search_dirs: impl IntoIterator<Item = P>,
    ) -> Result<Properties, ConfigError> {
        let mut tried = PathBuf::from(name);
        for dir in search_dirs {
            let candidate = dir.as_ref().join(name);
            log::trace!("looking for {}", candidate.display());
            match Properties::load(&candidate) {
                Err(ConfigError::NotFound { .. }) => tried = candidate,
                found => return found,
            }
        }
        Err(ConfigError::NotFound { path: tried })
    }

    /// Parses properties from `text`.
    pub fn parse(text: &str) -> Result<Properties, ConfigError> {
        Properties::parse_bytes(text.as_bytes())
    }

    fn parse_bytes(bytes: &[u8]) -> Result<Properties, ConfigError> {
        let text = String::from_utf8_lossy(strip_bom(bytes));
        let mut map = PropertyMap::default();
        // A lone `\r` ending the file belongs to the line terminator here.
        let mut lines = lines_of(text.as_bytes())
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .enumerate();
        while let Some((index, first)) = lines.next() {
            let line_number = index + 1;
            let first = String::from_utf8_lossy(first);
            let first = first.trim_start();
            if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
                continue;
            }
            let mut logical = first.to_string();
            while ends_in_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => {
                        logical.push_str(String::from_utf8_lossy(next).trim_start());
                    }
                    None => break,
                }
            }
            let (key, value) = split_key_value(&logical);
            let key = unescape(key, line_number)?;
            let value = unescape(value, line_number)?;
            map.insert(key, value);
        }
        Ok(Properties { map })
    }

    /// The value for `key`, if there is one.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// The value for `key`, or `default` if there's none.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Interprets the value for `key` as a boolean: `true`, `yes` and `on`
    /// are true, `false`, `no` and `off` are false, ignoring case.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.get(key) else { return Ok(None) };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(Some(true)),
            "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(invalid(key, value, "expected true or false")),
        }
    }

    /// Parses the value for `key` with `FromStr`.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get(key) else { return Ok(None) };
        value.trim().parse().map(Some).map_err(|e: T::Err| invalid(key, value, &e.to_string()))
    }

    /// Is there a value for `key`?
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// The number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Are there no keys at all?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over `(key, value)` pairs in the order keys first appeared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub(crate) fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// An odd number of trailing backslashes means the last one escapes the newline.
fn ends_in_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped `=`, `:` or whitespace.
/// Whitespace around the separator, and one `=` or `:`, belong to neither side.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = i;
            break;
        }
    }
    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start();
    }
    (key, rest)
}

fn unescape(text: &str, line: usize) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('f') => result.push('\u{0C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = if hex.len() == 4 { u32::from_str_radix(&hex, 16).ok() } else { None };
                match code.and_then(char::from_u32) {
                    Some(c) => result.push(c),
                    None => return Err(ConfigError::Malformed { line }),
                }
            }
            Some(other) => result.push(other),
            None => {}
        }
    }
    Ok(result)
}
