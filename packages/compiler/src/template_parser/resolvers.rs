//! Path Resolvers
//!
//! Grammar of component names, function paths and template paths:
//! `[plugin!]*physicalPath[:logicalPath]`. Physical segments are separated by `/` (or by `.`
//! in component tag names), logical segments always by `.`.

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

use crate::chars;
use crate::error::{CompilerError, Result};

const WS_PREFIX: &str = "ws:";
const PLUGIN_SEPARATOR: char = '!';
const LOGICAL_SEPARATOR: char = ':';

/// Legacy module names that contain a dot but are a single physical segment
const SPECIAL_MODULES: &[&str] = &["SBIS3.CONTROLS", "SBIS3.ENGINE"];

const FORBIDDEN_FUNCTION_EXTENSIONS: &[&str] = &[".tmpl", ".wml"];

type Segments = SmallVec<[String; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    plugins: Vec<String>,
    physical: Segments,
    logical: Segments,
    #[serde(skip)]
    physical_separator: char,
}

impl Path {
    /// The path as written: plugins, physical path with its original separator, logical path
    pub fn get_full_path(&self) -> String {
        let mut path = String::new();
        for plugin in &self.plugins {
            path.push_str(plugin);
            path.push(PLUGIN_SEPARATOR);
        }
        let separator = self.physical_separator.to_string();
        path.push_str(&self.physical.join(separator.as_str()));
        if self.has_logical_path() {
            path.push(LOGICAL_SEPARATOR);
            path.push_str(&self.get_logical_path());
        }
        path
    }

    /// Module name, always `/`-separated
    pub fn get_full_physical_path(&self) -> String {
        self.physical.join("/")
    }

    pub fn get_logical_path(&self) -> String {
        self.logical.join(".")
    }

    pub fn has_logical_path(&self) -> bool {
        !self.logical.is_empty()
    }

    pub fn has_plugins(&self) -> bool {
        !self.plugins.is_empty()
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn physical_segments(&self) -> &[String] {
        &self.physical
    }

    pub fn logical_segments(&self) -> &[String] {
        &self.logical
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_full_path())
    }
}

/// Parse a component tag name like `Controls.buttons:Button` or `ws:Module.Control`.
/// Plugins are not allowed in component names.
pub fn parse_component_name(name: &str) -> Result<Path> {
    let name = strip_ws_prefix(name);
    if name.contains(PLUGIN_SEPARATOR) {
        return Err(CompilerError::path(
            name,
            "plugins are not allowed in component names",
        ));
    }
    parse_path(name, Vec::new())
}

/// Parse a function path like `Module/library:func.inner`. File extensions are rejected.
pub fn parse_function_path(path: &str) -> Result<Path> {
    let (plugins, rest) = split_plugins(path);
    let parsed = parse_path(rest, plugins)?;
    if let Some(last) = parsed.physical.last() {
        let lower = last.to_ascii_lowercase();
        if let Some(extension) = FORBIDDEN_FUNCTION_EXTENSIONS
            .iter()
            .find(|ext| lower.ends_with(*ext))
        {
            return Err(CompilerError::path(
                path,
                format!("function path must not contain the \"{}\" extension", extension),
            ));
        }
    }
    Ok(parsed)
}

/// Parse a template path like `wml!Controls/list/item`
pub fn parse_template_path(path: &str) -> Result<Path> {
    let (plugins, rest) = split_plugins(path);
    parse_path(rest, plugins)
}

/// Component references: capitalized, dotted or colon-separated, no Cyrillic letters
pub fn is_component(name: &str) -> bool {
    let name = strip_ws_prefix(name);
    let starts_capitalized = name.chars().next().map_or(false, |ch| ch.is_ascii_uppercase());
    starts_capitalized
        && (name.contains(chars::PERIOD) || name.contains(LOGICAL_SEPARATOR))
        && !name.chars().any(chars::is_cyrillic)
}

/// `ws:`-prefixed names that do not reference a component
pub fn is_option(name: &str) -> bool {
    name.starts_with(WS_PREFIX) && !is_component(name)
}

/// Name without the `ws:` prefix
pub fn strip_ws_prefix(name: &str) -> &str {
    name.strip_prefix(WS_PREFIX).unwrap_or(name)
}

fn split_plugins(path: &str) -> (Vec<String>, &str) {
    match path.rfind(PLUGIN_SEPARATOR) {
        Some(index) => (
            path[..index]
                .split(PLUGIN_SEPARATOR)
                .map(str::to_string)
                .collect(),
            &path[index + 1..],
        ),
        None => (Vec::new(), path),
    }
}

fn parse_path(path: &str, plugins: Vec<String>) -> Result<Path> {
    let mut parts = path.split(LOGICAL_SEPARATOR);
    let physical_part = parts.next().unwrap_or_default();
    let logical_part = parts.next();
    if parts.next().is_some() {
        return Err(CompilerError::path(
            path,
            "only one \":\" separator is allowed",
        ));
    }
    if plugins.iter().any(String::is_empty) {
        return Err(CompilerError::path(path, "empty plugin name"));
    }

    let physical_separator = if physical_part.contains('/') { '/' } else { chars::PERIOD };
    let physical = split_physical(physical_part, physical_separator);
    if physical.is_empty() || physical.iter().any(String::is_empty) {
        return Err(CompilerError::path(path, "empty physical path segment"));
    }

    let logical: Segments = match logical_part {
        Some(part) => part.split(chars::PERIOD).map(str::to_string).collect(),
        None => SmallVec::new(),
    };
    if logical.iter().any(String::is_empty) {
        return Err(CompilerError::path(path, "empty logical path segment"));
    }

    Ok(Path {
        plugins,
        physical,
        logical,
        physical_separator,
    })
}

fn split_physical(physical: &str, separator: char) -> Segments {
    if physical.is_empty() {
        return SmallVec::new();
    }
    if separator == chars::PERIOD {
        for special in SPECIAL_MODULES {
            if physical == *special {
                return smallvec::smallvec![physical.to_string()];
            }
            if let Some(rest) = physical
                .strip_prefix(special)
                .and_then(|rest| rest.strip_prefix(chars::PERIOD))
            {
                let mut segments: Segments = smallvec::smallvec![special.to_string()];
                segments.extend(rest.split(separator).map(str::to_string));
                return segments;
            }
        }
    }
    physical.split(separator).map(str::to_string).collect()
}
