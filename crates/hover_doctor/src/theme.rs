//! Theme store: one flat JSON object per file in a directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::color::{self, Rgb};
use crate::error::{CheckError, Result};

pub const BACKGROUND: &str = "background";
pub const HOVER: &str = "hover";

/// A parsed theme record. Only `background` and `hover` matter here; every
/// other attribute is carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub attributes: Map<String, Value>,
}

impl Theme {
    pub fn from_json(name: impl Into<String>, raw: &str) -> Result<Self> {
        let name = name.into();
        let value: Value = serde_json::from_str(raw).map_err(|error| CheckError::MalformedTheme {
            theme: name.clone(),
            reason: error.to_string(),
        })?;
        match value {
            Value::Object(attributes) => Ok(Self { name, attributes }),
            other => Err(CheckError::MalformedTheme {
                theme: name,
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Decode a color attribute. A missing key, a non-string value and a bad
    /// hex encoding all surface as [`CheckError::MalformedColor`].
    pub fn color(&self, attribute: &str) -> Result<Rgb> {
        let malformed = |value: String, reason: String| CheckError::MalformedColor {
            theme: self.name.clone(),
            attribute: attribute.to_string(),
            value,
            reason,
        };

        match self.attributes.get(attribute) {
            None => Err(malformed("<missing>".to_string(), "attribute not present".to_string())),
            Some(Value::String(raw)) => {
                color::decode(raw).map_err(|error| malformed(raw.clone(), error.to_string()))
            }
            Some(other) => Err(malformed(
                other.to_string(),
                format!("expected a string, found {}", json_kind(other)),
            )),
        }
    }

    pub fn background(&self) -> Result<Rgb> {
        self.color(BACKGROUND)
    }

    pub fn hover(&self) -> Result<Rgb> {
        self.color(HOVER)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One file from the theme store. A file that could not be read or parsed
/// still gets an entry so that it fails on its own line of the report.
#[derive(Debug)]
pub struct ThemeEntry {
    pub name: String,
    pub theme: Result<Theme>,
}

/// Load every `*.<extension>` file directly inside `dir`, ordered by file
/// name. A missing or unreadable directory yields an empty list; the caller
/// decides that an empty store fails the run.
pub fn load_theme_dir(dir: &Path, extension: &str) -> Vec<ThemeEntry> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(error) => {
            warn!(dir = %dir.display(), %error, "theme directory unreadable");
            return Vec::new();
        }
    };

    let mut files = BTreeMap::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(dir = %dir.display(), %error, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.insert(name, path);
    }

    files
        .into_iter()
        .map(|(name, path)| {
            let theme = fs::read_to_string(&path)
                .map_err(|error| CheckError::MalformedTheme {
                    theme: name.clone(),
                    reason: error.to_string(),
                })
                .and_then(|raw| Theme::from_json(name.clone(), &raw));
            debug!(theme = %name, ok = theme.is_ok(), "loaded theme record");
            ThemeEntry { name, theme }
        })
        .collect()
}
