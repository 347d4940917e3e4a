//! INI Reader
//! Sections with `key = value` or `key: value` entries; keys are case-insensitive.

use super::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniConfig {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniConfig {
    /// Parse INI text.
    ///
    /// Lines starting with `#` or `;` are comments; ` #` starts an inline comment. Entries before
    /// the first section header are an error.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| ConfigError::Syntax {
                    line: i + 1,
                    message: format!("unterminated section header '{line}'"),
                })?;
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let section = current.as_ref().ok_or_else(|| ConfigError::Syntax {
                line: i + 1,
                message: "entry before the first section header".to_string(),
            })?;
            let split = line
                .find(['=', ':'])
                .ok_or_else(|| ConfigError::Syntax {
                    line: i + 1,
                    message: format!("expected 'key = value', got '{line}'"),
                })?;
            let key = line[..split].trim().to_lowercase();
            let value = strip_inline_comment(&line[split + 1..]).trim().to_string();
            sections
                .entry(section.clone())
                .or_default()
                .insert(key, value);
        }

        Ok(Self { sections })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(&key.to_lowercase())
            .map(String::as_str)
    }

    /// The value, or `fallback` when the section or key is missing.
    pub fn get_or(&self, section: &str, key: &str, fallback: &str) -> String {
        self.get(section, key).unwrap_or(fallback).to_string()
    }

    /// A required value.
    pub fn require(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.get(section, key).ok_or_else(|| ConfigError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// A required value parsed into `T`.
    pub fn parse_value<T: FromStr>(&self, section: &str, key: &str) -> Result<T, ConfigError> {
        let value = self.require(section, key)?;
        value.parse().map_err(|_| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Inline comments need whitespace before the `#`.
fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return &value[..i];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "\
# Environment
[Localisation]
timezone = Europe/Amsterdam   # local time

[Weather]
WPW_dir: ~/data/wp/
colour = #00ff00
; other comment
[Empty]
";

    #[test]
    fn test_parse() {
        let ini = IniConfig::parse(TEXT).unwrap();
        assert_eq!(ini.get("Localisation", "timezone"), Some("Europe/Amsterdam"));
        assert_eq!(ini.get("Weather", "wpw_dir"), Some("~/data/wp/"));
        assert_eq!(ini.get("Weather", "WPW_DIR"), Some("~/data/wp/"));
        // No whitespace before '#': part of the value
        assert_eq!(ini.get("Weather", "colour"), Some("#00ff00"));
        assert!(ini.has_section("Empty"));
        assert_eq!(ini.sections().count(), 3);
        assert_eq!(ini.get_or("HWC", "hwc_dir", "none"), "none");
    }

    #[test]
    fn test_typed_values() {
        let ini = IniConfig::parse("[Site]\nlon = 5.1\nname = home\n").unwrap();
        let lon: f64 = ini.parse_value("Site", "lon").unwrap();
        assert_eq!(lon, 5.1);
        assert!(matches!(
            ini.parse_value::<f64>("Site", "name"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ini.require("Site", "lat"),
            Err(ConfigError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            IniConfig::parse("key = value\n"),
            Err(ConfigError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            IniConfig::parse("[Section\n"),
            Err(ConfigError::Syntax { line: 1, .. })
        ));
        assert!(matches!(
            IniConfig::parse("[S]\njust words\n"),
            Err(ConfigError::Syntax { line: 2, .. })
        ));
    }
}
