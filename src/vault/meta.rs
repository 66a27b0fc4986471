//! Front matter and tags.
//!
//! Notes may open with YAML (`---`) or TOML (`+++`) front matter. The
//! metadata is kept as an ordered JSON map so unknown keys survive the
//! round trip into the intermediate file. `tags` is pulled out into its own
//! list and accepts both a sequence and a comma separated string.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    Yaml,
    Toml,
}

/// Front matter block split off a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    pub raw: &'a str,
    pub body: &'a str,
    pub format: FrontMatterFormat,
}

/// Split front matter from the body.
///
/// The opening fence must be the first line; the closing fence is the next
/// line consisting of the same fence.
pub fn split_front_matter(content: &str) -> Option<FrontMatter<'_>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let (fence, format) = if content.starts_with("---") {
        ("---", FrontMatterFormat::Yaml)
    } else if content.starts_with("+++") {
        ("+++", FrontMatterFormat::Toml)
    } else {
        return None;
    };

    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != fence {
        return None;
    }

    let rest = &content[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == fence {
            let raw = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some(FrontMatter { raw, body, format });
        }
        offset += line.len();
    }
    None
}

/// Parse a note's front matter, returning the metadata and the body.
///
/// A note without front matter has empty metadata. A malformed block is a
/// [`BuildError::FrontMatter`].
pub fn extract<'a>(content: &'a str, rel_path: &str) -> Result<(NoteMeta, &'a str), BuildError> {
    let Some(fm) = split_front_matter(content) else {
        return Ok((NoteMeta::default(), content));
    };

    let parsed = match fm.format {
        FrontMatterFormat::Yaml => NoteMeta::parse_yaml(fm.raw),
        FrontMatterFormat::Toml => NoteMeta::parse_toml(fm.raw),
    };
    let meta = parsed.map_err(|message| BuildError::FrontMatter {
        path: rel_path.to_string(),
        message,
    })?;
    Ok((meta, fm.body))
}

// ============================================================================
// NoteMeta
// ============================================================================

/// Front matter fields plus the merged tag list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteMeta {
    /// Every field except `tags`, in source order.
    fields: Map<String, Value>,
    /// Front matter tags followed by inline tags, de-duplicated.
    pub tags: Vec<String>,
}

impl NoteMeta {
    pub fn parse_yaml(src: &str) -> Result<Self, String> {
        if src.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(src).map_err(|e| e.to_string())?;
        match serde_json::to_value(value).map_err(|e| e.to_string())? {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self::from_fields(map)),
            _ => Err("front matter must be a mapping".into()),
        }
    }

    pub fn parse_toml(src: &str) -> Result<Self, String> {
        let table: toml::Table = toml::from_str(src).map_err(|e| e.to_string())?;
        match toml_to_json(toml::Value::Table(table)) {
            Value::Object(map) => Ok(Self::from_fields(map)),
            _ => Ok(Self::default()),
        }
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        let mut meta = Self::default();
        if let Some(tags) = fields.shift_remove("tags") {
            meta.add_tags(tag_values(&tags));
        }
        meta.fields = fields;
        meta
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    pub fn graph_id(&self) -> Option<&str> {
        self.get("graph_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Append tags, skipping ones already present.
    pub fn add_tags(&mut self, tags: impl IntoIterator<Item = String>) {
        for tag in tags {
            let tag = tag.trim().trim_start_matches('#').trim().to_string();
            if !tag.is_empty() && !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }

    /// Render the metadata back as a YAML front matter block.
    ///
    /// Empty metadata renders as an empty string.
    pub fn to_front_matter(&self) -> Result<String, serde_yaml::Error> {
        if self.fields.is_empty() && self.tags.is_empty() {
            return Ok(String::new());
        }
        let mut map = self.fields.clone();
        if !self.tags.is_empty() {
            map.insert(
                "tags".into(),
                Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
            );
        }
        let yaml = serde_yaml::to_string(&map)?;
        Ok(format!("---\n{yaml}---\n\n"))
    }
}

fn tag_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

// ============================================================================
// Inline tags
// ============================================================================

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|\s)#([\w/-]+)").expect("valid tag regex"));

/// Collect `#tag` tokens from note text, in order of appearance.
///
/// Call on text whose code regions were already stripped. Headings never
/// match because their `#` is followed by a space; purely numeric tokens
/// such as `#42` are skipped.
pub fn inline_tags(text: &str) -> Vec<String> {
    INLINE_TAG
        .captures_iter(text)
        .map(|caps| caps[1].trim_end_matches(['/', '-']).to_string())
        .filter(|tag| !tag.is_empty() && !tag.chars().all(|c| c.is_ascii_digit()))
        .collect()
}
