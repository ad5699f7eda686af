//! Tunnel configuration templates.
//!
//! A template is an ordinary `wg-quick` style configuration file. Rendering
//! substitutes the nine obfuscation fields inside `[Interface]` and keeps
//! every other line untouched, so keys, comments and peers survive as written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::parameters::{AwgParams, ParamField};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot list templates in {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template `{name}` has no [Interface] section")]
    MissingInterface { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Interface,
    Peer,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TunnelTemplate {
    name: String,
    lines: Vec<String>,
    trailing_newline: bool,
    line_ending: &'static str,
    base: AwgParams,
    endpoint: Option<String>,
}

impl TunnelTemplate {
    /// Parse template text. Obfuscation values already present become the
    /// base parameters; unparsable values are ignored with a warning.
    pub fn parse(name: impl Into<String>, content: &str) -> Result<Self, TemplateError> {
        let name = name.into();
        let lines: Vec<String> = content.lines().map(str::to_string).collect();

        let mut base = AwgParams::default();
        let mut endpoint = None;
        let mut has_interface = false;
        let mut section = Section::Preamble;

        for line in &lines {
            if let Some(next) = section_header(line) {
                section = next;
                has_interface |= section == Section::Interface;
                continue;
            }
            let Some((key, value)) = key_value(line) else {
                continue;
            };
            match section {
                Section::Interface => {
                    if let Some(field) = ParamField::from_key(key) {
                        match value.parse::<u32>() {
                            Ok(parsed) => base.set(field, parsed),
                            Err(_) => warn!(template = %name, key, value, "ignoring invalid obfuscation value"),
                        }
                    }
                }
                Section::Peer if key.eq_ignore_ascii_case("Endpoint") => {
                    endpoint = Some(value.to_string());
                }
                _ => {}
            }
        }

        if !has_interface {
            return Err(TemplateError::MissingInterface { name });
        }

        Ok(Self {
            name,
            lines,
            trailing_newline: content.ends_with('\n'),
            line_ending: if content.contains("\r\n") { "\r\n" } else { "\n" },
            base,
            endpoint,
        })
    }

    /// Load one template; its name is the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());
        Self::parse(name, &content)
    }

    /// Load a single file, or every `*.conf` file of a directory sorted by
    /// file name. An empty directory yields an empty list.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>, TemplateError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Ok(vec![Self::load(path)?]);
        }

        let read_dir_error = |source| TemplateError::ReadDir {
            path: path.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(path).map_err(read_dir_error)? {
            let entry_path = entry.map_err(read_dir_error)?.path();
            if entry_path.is_file() && entry_path.extension().is_some_and(|ext| ext == "conf") {
                files.push(entry_path);
            }
        }
        files.sort();

        files.iter().map(Self::load).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Obfuscation values found in the template, defaults for missing ones.
    pub fn base_params(&self) -> &AwgParams {
        &self.base
    }

    /// Peer endpoint, for display only.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Render the template with `params` substituted.
    ///
    /// Lines end the way the template's do (`\r\n` or `\n`).
    /// Existing keys are replaced in place (spacing around `=` is kept).
    /// Keys the template lacks are appended after the last non-blank line of
    /// the first `[Interface]` section, in field order.
    pub fn render(&self, params: &AwgParams) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.lines.len() + ParamField::ALL.len());
        let mut present = Vec::new();
        let mut insert_at = None;
        let mut section = Section::Preamble;
        // Only the first [Interface] section receives inserted keys.
        let mut in_first_interface = false;

        for line in &self.lines {
            if let Some(next) = section_header(line) {
                in_first_interface = next == Section::Interface && insert_at.is_none();
                section = next;
                out.push(line.clone());
                if in_first_interface {
                    insert_at = Some(out.len());
                }
                continue;
            }

            if section != Section::Interface {
                out.push(line.clone());
                continue;
            }

            match key_value(line).and_then(|(key, _)| ParamField::from_key(key)) {
                Some(field) => {
                    out.push(replace_value(line, params.get(field)));
                    present.push(field);
                }
                None => out.push(line.clone()),
            }
            if in_first_interface && !line.trim().is_empty() {
                insert_at = Some(out.len());
            }
        }

        let missing: Vec<String> = ParamField::ALL
            .iter()
            .filter(|field| !present.contains(field))
            .map(|&field| format!("{} = {}", field.key(), params.get(field)))
            .collect();
        if let Some(position) = insert_at {
            out.splice(position..position, missing);
        }

        let mut rendered = out.join(self.line_ending);
        if self.trailing_newline {
            rendered.push_str(self.line_ending);
        }
        rendered
    }
}

fn section_header(line: &str) -> Option<Section> {
    let trimmed = line.trim();
    let name = trimmed.strip_prefix('[')?.strip_suffix(']')?.trim();
    Some(if name.eq_ignore_ascii_case("Interface") {
        Section::Interface
    } else if name.eq_ignore_ascii_case("Peer") {
        Section::Peer
    } else {
        Section::Other
    })
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') || trimmed.starts_with(';') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value.trim()))
}

fn replace_value(line: &str, value: u32) -> String {
    match line.split_once('=') {
        Some((head, tail)) => {
            let spacing = &tail[..tail.len() - tail.trim_start().len()];
            format!("{head}={spacing}{value}")
        }
        None => line.to_string(),
    }
}
