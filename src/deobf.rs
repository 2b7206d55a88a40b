use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::Result;

/// Produces unobfuscated class names from a Proguard-style mapping file.
///
/// Mapping files have the following line grammar:
///
/// ```text
/// line : comment | class_mapping | member_mapping
/// comment: '#' ...
/// class_mapping: type_name ' -> ' obfuscated_name ':'
/// member_mapping: '    ' type_name ' ' member_name ' -> ' obfuscated_name
/// ```
///
/// Only class mappings matter here; every other line is ignored. Lookups are
/// whole-string only.
#[derive(Debug, Default, Clone)]
pub struct Deobfuscator {
    mapping: HashMap<String, String>,
}

impl Deobfuscator {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::from_mapping_text(&fs::read_to_string(path)?))
    }

    pub fn from_mapping_text(text: &str) -> Self {
        let mut mapping = HashMap::new();
        for line in text.lines() {
            if let Some((original, obfuscated)) = parse_class_line(line) {
                mapping.insert(obfuscated.to_string(), original.to_string());
            }
        }
        Self { mapping }
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn deobfuscate<'a>(&'a self, name: &'a str) -> &'a str {
        self.mapping.get(name).map(String::as_str).unwrap_or(name)
    }
}

/// Class mapping lines are the only ones starting with an identifier
/// character and ending with a colon.
fn parse_class_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_suffix(':')?;
    let (original, obfuscated) = rest.split_once(" -> ")?;
    if !original.chars().next()?.is_ascii_alphabetic() {
        return None;
    }
    if original.contains(char::is_whitespace)
        || obfuscated.is_empty()
        || obfuscated.contains(':')
    {
        return None;
    }
    Some((original, obfuscated))
}
