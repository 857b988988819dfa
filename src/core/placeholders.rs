use crate::domain::errors::{PromptError, Result};
use crate::domain::models::EmptyValuePolicy;
use log::debug;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(.*?)\}").expect("placeholder regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Code,
    Error,
    Input,
    DirectoryStructure,
    NotFoundFilesPrompt,
    NotFoundFiles,
    ConditionalFilePathRequestPrompt,
    FilePathRequestPrompt,
}

impl Placeholder {
    pub const ALL: [Placeholder; 8] = [
        Placeholder::Code,
        Placeholder::Error,
        Placeholder::Input,
        Placeholder::DirectoryStructure,
        Placeholder::NotFoundFilesPrompt,
        Placeholder::NotFoundFiles,
        Placeholder::ConditionalFilePathRequestPrompt,
        Placeholder::FilePathRequestPrompt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Placeholder::Code => "code",
            Placeholder::Error => "error",
            Placeholder::Input => "input",
            Placeholder::DirectoryStructure => "directory_structure",
            Placeholder::NotFoundFilesPrompt => "not_found_files_prompt",
            Placeholder::NotFoundFiles => "not_found_files",
            Placeholder::ConditionalFilePathRequestPrompt => "conditional_file_path_request_prompt",
            Placeholder::FilePathRequestPrompt => "file_path_request_prompt",
        }
    }

    /// Values derived after collection rather than asked for.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Placeholder::NotFoundFilesPrompt
                | Placeholder::NotFoundFiles
                | Placeholder::ConditionalFilePathRequestPrompt
                | Placeholder::FilePathRequestPrompt
        )
    }

    fn token(self) -> String {
        format!("{{{}}}", self.as_str())
    }
}

impl FromStr for Placeholder {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        Self::ALL.into_iter().find(|p| p.as_str() == s).ok_or(())
    }
}

/// Returns the distinct placeholders of `template` in order of first use.
///
/// Any `{name}` outside the allow-list is a configuration error.
pub fn extract_placeholders(template: &str) -> Result<Vec<Placeholder>> {
    let mut found = Vec::new();
    let mut disallowed: Vec<String> = Vec::new();

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let name = &caps[1];
        match name.parse::<Placeholder>() {
            Ok(p) if !found.contains(&p) => found.push(p),
            Ok(_) => {}
            Err(()) if !disallowed.iter().any(|d| d == name) => disallowed.push(name.to_string()),
            Err(()) => {}
        }
    }

    if !disallowed.is_empty() {
        return Err(PromptError::InvalidPlaceholders {
            template: template.lines().next().unwrap_or_default().to_string(),
            names: disallowed.join(" "),
        });
    }

    Ok(found)
}

/// Collected placeholder values in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InputValues {
    values: HashMap<Placeholder, String>,
    order: Vec<Placeholder>,
}

impl InputValues {
    pub fn insert(&mut self, placeholder: Placeholder, value: impl Into<String>) {
        if self.values.insert(placeholder, value.into()).is_none() {
            self.order.push(placeholder);
        }
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn is_blank(&self, placeholder: Placeholder) -> bool {
        self.get(placeholder).is_some_and(|v| v.trim().is_empty())
    }
}

fn sole_placeholder(line: &str) -> Option<Placeholder> {
    let trimmed = line.trim();
    Placeholder::ALL.into_iter().find(|p| trimmed == p.token())
}

/// Fills `template` with `values` in a single pass.
///
/// Placeholders without a value are left untouched. Text inside values is
/// never scanned for placeholders again.
pub fn substitute(template: &str, values: &InputValues, on_empty: EmptyValuePolicy) -> String {
    if values.is_empty() {
        return template.to_string();
    }

    let mut kept: Vec<&str> = Vec::new();

    for line in template.split('\n') {
        let drop = on_empty == EmptyValuePolicy::DropLine
            && sole_placeholder(line).is_some_and(|p| values.is_blank(p));
        if !drop {
            kept.push(line);
            continue;
        }

        debug!("Dropping template line {:?} for an empty value", line);
        if kept.last().is_some_and(|prev| prev.starts_with('#')) {
            kept.pop();
        }
    }

    let body = kept.join("\n");
    PLACEHOLDER_RE
        .replace_all(&body, |caps: &Captures| {
            caps[1]
                .parse::<Placeholder>()
                .ok()
                .and_then(|p| values.get(p))
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
