//! Configuration loading (§7.1, §6 "Configuration surface"): the
//! symbol-alias table, function-alias table, and output-formatting options
//! loaded once per process from an optional TOML file, mirroring the shape
//! the teacher's own CLI loads its manifests with (`serde` + `toml`, a
//! `Config::load`/`load_from_path` pair with compiled-in defaults as the
//! fallback).

use oloc_lex::{default_function_table, default_symbol_table, AliasTable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, consulted the way `faxt.toml` is for the
/// teacher's CLI.
pub const CONFIG_FILE_NAME: &str = "oloc.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

/// One alias-table row as it appears in TOML: a canonical key plus its
/// ordered list of surface spellings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    pub key: String,
    pub aliases: Vec<String>,
}

/// The `[format]` table of §6: spacing, digit grouping, and irrational
/// rendering options for the output filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatOptions {
    /// Spaces inserted around binary operators when rendering a result.
    pub token_spacing: usize,
    /// Digit-grouping threshold: `-1` disables grouping, else `2..=12`.
    pub digit_group_threshold: i32,
    /// Digit-grouping interval (digits per group), `1..=6`.
    pub digit_group_interval: u8,
    /// Integers with more digits than this render in scientific notation;
    /// `0` disables scientific notation entirely.
    pub scientific_notation_threshold: u32,
    /// Render integer exponents as Unicode superscripts (`x²`) rather than
    /// `x^2`.
    pub superscript_exponents: bool,
    /// Use `_` instead of `,` as the digit-group separator.
    pub underscore_separator: bool,
    /// Omit `*` between a coefficient and its atom, and between adjacent
    /// factors, wherever the grammar would still parse it back unchanged.
    pub omit_multiplication: bool,
    /// Keep a custom irrational's attached `?`-parameter tag in the
    /// rendered output instead of dropping it.
    pub retain_irrational_params: bool,
    /// Render `π`/`𝑒` in ASCII (`pi`/`e`) instead of their Unicode forms.
    pub ascii_irrationals: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            token_spacing: 0,
            digit_group_threshold: -1,
            digit_group_interval: 3,
            scientific_notation_threshold: 0,
            superscript_exponents: false,
            underscore_separator: false,
            omit_multiplication: true,
            retain_irrational_params: false,
            ascii_irrationals: false,
        }
    }
}

impl FormatOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.digit_group_threshold != -1
            && !(2..=12).contains(&self.digit_group_threshold)
        {
            return Err(ConfigError::InvalidValue(format!(
                "digit_group_threshold must be -1 or in 2..=12, got {}",
                self.digit_group_threshold
            )));
        }
        if !(1..=6).contains(&self.digit_group_interval) {
            return Err(ConfigError::InvalidValue(format!(
                "digit_group_interval must be in 1..=6, got {}",
                self.digit_group_interval
            )));
        }
        Ok(())
    }
}

/// The raw, optional shape a TOML config file may take; every field falls
/// back to the compiled-in default when absent.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    symbols: Vec<AliasEntry>,
    #[serde(default)]
    functions: Vec<AliasEntry>,
    #[serde(default)]
    format: FormatOptions,
}

/// The loaded, validated configuration handed down as immutable context to
/// the pipeline (§9 "load once, pass as explicit context").
#[derive(Debug, Clone)]
pub struct Config {
    pub symbol_table: AliasTable,
    pub function_table: AliasTable,
    pub format: FormatOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol_table: default_symbol_table(),
            function_table: default_function_table(),
            format: FormatOptions::default(),
        }
    }
}

impl Config {
    /// Look for `oloc.toml` in the current directory; fall back to
    /// compiled-in defaults if it isn't there.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        raw.format.validate()?;

        let symbol_table = if raw.symbols.is_empty() {
            default_symbol_table()
        } else {
            AliasTable::new(raw.symbols.into_iter().map(|e| (e.key, e.aliases)).collect())
        };
        let function_table = if raw.functions.is_empty() {
            default_function_table()
        } else {
            AliasTable::new(raw.functions.into_iter().map(|e| (e.key, e.aliases)).collect())
        };

        Ok(Self {
            symbol_table,
            function_table,
            format: raw.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_defaults() {
        let config = Config::default();
        assert!(config.symbol_table.contains_canonical("+"));
        assert!(config.function_table.contains_canonical("sqrt"));
        assert_eq!(config.format.digit_group_threshold, -1);
    }

    #[test]
    fn invalid_digit_group_threshold_rejected() {
        let toml = "[format]\ndigit_group_threshold = 20\n";
        assert!(Config::from_toml_str(toml).is_err());
    }

    #[test]
    fn invalid_digit_group_interval_rejected() {
        let toml = "[format]\ndigit_group_interval = 0\n";
        assert!(Config::from_toml_str(toml).is_err());
    }

    #[test]
    fn custom_format_parses() {
        let toml = "[format]\nsuperscript_exponents = true\nascii_irrationals = true\n";
        let config = Config::from_toml_str(toml).unwrap();
        assert!(config.format.superscript_exponents);
        assert!(config.format.ascii_irrationals);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.format, FormatOptions::default());
    }
}
