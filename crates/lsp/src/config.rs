use ide::color::ColorFormat;
use ide::file_system::ScanConfig;
use ide::handlers::diagnostics::Severity;
use serde_json::Value;
use thiserror::Error;

pub const CONFIG_SECTION: &str = "cssVariables";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value of {CONFIG_SECTION}.{key}: {source}")]
    InvalidValue {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown color format '{0}', expected hex, rgb or hsl")]
    UnknownColorFormat(String),
    #[error("unknown severity '{0}', expected error, warning, info or off")]
    UnknownSeverity(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    pub scan: ScanConfig,
    pub color_format: ColorFormat,
    /// `None` turns the undefined variable check off.
    pub undefined_var: Option<Severity>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            color_format: ColorFormat::default(),
            undefined_var: Some(Severity::Warning),
        }
    }
}

impl Config {
    /// Applies the settings found in `v`, which is either the
    /// `cssVariables` section itself or an object holding it. Nothing is
    /// changed when a value is invalid.
    pub fn update(&mut self, mut v: Value) -> Result<(), ConfigError> {
        let mut section = if v.get(CONFIG_SECTION).is_some() {
            v[CONFIG_SECTION].take()
        } else {
            v
        };

        let mut next = self.clone();
        if let Some(include) = take::<Vec<String>>(&mut section, "lookupFiles")? {
            next.scan.include = include;
        }
        if let Some(exclude) = take::<Vec<String>>(&mut section, "blacklistFolders")? {
            next.scan.exclude = exclude
                .iter()
                .flat_map(|folder| exclude_patterns(folder))
                .collect();
        }
        if let Some(format) = take::<String>(&mut section, "colorFormat")? {
            next.color_format =
                ColorFormat::from_name(&format).ok_or(ConfigError::UnknownColorFormat(format))?;
        }
        if let Some(severity) = take::<String>(&mut section, "undefinedVarFallback")? {
            next.undefined_var = match severity.as_str() {
                "off" | "none" => None,
                name => Some(
                    Severity::from_name(name)
                        .ok_or_else(|| ConfigError::UnknownSeverity(name.to_string()))?,
                ),
            };
        }

        *self = next;
        Ok(())
    }
}

fn take<T: serde::de::DeserializeOwned>(
    section: &mut Value,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(v) = section.pointer_mut(&format!("/{key}")) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    serde_json::from_value(v.take())
        .map(Some)
        .map_err(|source| ConfigError::InvalidValue { key, source })
}

/// A bare folder name excludes that folder anywhere; anything containing a
/// glob character is used as is.
fn exclude_patterns(folder: &str) -> Vec<String> {
    if folder.contains(['*', '?', '[', '{']) {
        return vec![folder.to_string()];
    }
    let folder = folder.trim_matches('/');
    vec![format!("**/{folder}"), format!("**/{folder}/**")]
}
