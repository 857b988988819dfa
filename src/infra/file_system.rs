use crate::domain::errors::{PromptError, Result};
use crate::domain::models::{DirMatchPolicy, DirectoryRecord, FolderMapping, IgnoreSettings};
use crate::infra::sanitize::Sanitizer;
use glob::Pattern;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path, PathBuf};

/// Directory holding generated prompts, relative to the project root.
pub const OUTPUT_DIR: &str = ".prompt_assist";
pub const OUTPUT_FILE: &str = "prompt.md";

const SEEDED_PATTERNS: [&str; 2] = [".git/", ".prompt_assist/"];
const IGNORE_FILES: [&str; 2] = [".gitignore", ".dirignore"];

/// Wildcards in file specs never match a leading dot, so hidden files stay out.
const SPEC_GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Replaces the first segment of `path` with `new_root` when it equals `old_root`.
pub fn remap_top_folder(path: &str, old_root: &str, new_root: &str) -> String {
    let is_absolute = path.starts_with(MAIN_SEPARATOR);
    let mut parts: Vec<&str> = path.trim_matches(MAIN_SEPARATOR).split(MAIN_SEPARATOR).collect();

    if parts.first() == Some(&old_root) {
        parts[0] = new_root;
    }

    let adjusted = parts.join(MAIN_SEPARATOR_STR);
    if is_absolute {
        format!("{}{}", MAIN_SEPARATOR, adjusted.trim_start_matches(MAIN_SEPARATOR))
    } else {
        adjusted
    }
}

fn has_glob_chars(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn parse_ignore_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut patterns = Vec::new();

    if !path.is_file() {
        debug!("No ignore file found at: {}", path.display());
        return Ok(patterns);
    }

    debug!("Parsing ignore file at: {}", path.display());
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    for line in reader.split(b'\n') {
        let line = Sanitizer::default().decode(&line?);
        let trimmed = line.trim();

        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            patterns.push(trimmed.to_string());
        }
    }

    info!("Loaded {} patterns from {}", patterns.len(), path.display());
    Ok(patterns)
}

/// Seeded patterns followed by the lines of `.gitignore` and `.dirignore`.
pub fn load_ignore_patterns(settings: &IgnoreSettings) -> Vec<String> {
    let mut patterns: Vec<String> = SEEDED_PATTERNS.iter().map(|s| s.to_string()).collect();

    if !settings.use_ignore_files {
        debug!("Ignore files disabled, using seeded patterns only");
        return patterns;
    }

    for name in IGNORE_FILES {
        let path = settings.search_dir.join(name);
        match parse_ignore_file(&path) {
            Ok(found) => patterns.extend(found),
            Err(e) => warn!("Could not read {}: {}", path.display(), e),
        }
    }

    patterns
}

#[derive(Debug, Clone)]
enum IgnoreRule {
    Directory(Pattern),
    ContainedIn(PathBuf),
    Glob(Pattern),
    Exact(String),
}

/// Ordered ignore rules; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    rules: Vec<IgnoreRule>,
}

impl IgnoreMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S], policy: DirMatchPolicy) -> Self {
        let rules = patterns
            .iter()
            .map(|p| Self::compile(p.as_ref(), policy))
            .collect();
        Self { rules }
    }

    pub fn from_settings(settings: &IgnoreSettings) -> Self {
        let patterns = load_ignore_patterns(settings);
        Self::new(patterns.as_slice(), settings.dir_match)
    }

    fn compile(pattern: &str, policy: DirMatchPolicy) -> IgnoreRule {
        if pattern.ends_with('/') || pattern.ends_with(MAIN_SEPARATOR) {
            let stripped = pattern.trim_end_matches(['/', MAIN_SEPARATOR]);
            return match policy {
                DirMatchPolicy::Basename => {
                    let base = Path::new(stripped)
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| stripped.to_string());
                    let pattern = Pattern::new(&base)
                        .or_else(|_| Pattern::new(&Pattern::escape(&base)))
                        .unwrap_or_default();
                    IgnoreRule::Directory(pattern)
                }
                DirMatchPolicy::Containment => IgnoreRule::ContainedIn(PathBuf::from(
                    stripped.trim_start_matches(['/', MAIN_SEPARATOR]),
                )),
            };
        }

        if has_glob_chars(pattern) {
            match Pattern::new(pattern) {
                Ok(p) => return IgnoreRule::Glob(p),
                Err(e) => debug!("Treating invalid glob '{}' as a literal: {}", pattern, e),
            }
        }

        IgnoreRule::Exact(pattern.to_string())
    }

    /// Checks `path` (made relative to `root`) against the rules.
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        let rel_path = path.strip_prefix(root).unwrap_or(path);
        let rel_str = if rel_path.as_os_str().is_empty() {
            ".".to_string()
        } else {
            rel_path.to_string_lossy().to_string()
        };

        self.rules.iter().any(|rule| {
            let matched = match rule {
                IgnoreRule::Directory(pattern) => rel_path
                    .file_name()
                    .map(|name| pattern.matches(&name.to_string_lossy()))
                    .unwrap_or(false),
                IgnoreRule::ContainedIn(dir) => rel_path.starts_with(dir),
                IgnoreRule::Glob(pattern) => pattern.matches(&rel_str),
                IgnoreRule::Exact(literal) => rel_str == *literal,
            };
            if matched {
                debug!("Path {} matches ignore rule {:?}", rel_str, rule);
            }
            matched
        })
    }
}

/// Walks `root` top-down, pruning ignored directories before descending.
pub fn scan_directory(root: &Path, matcher: &IgnoreMatcher) -> Result<Vec<DirectoryRecord>> {
    if !root.exists() {
        return Err(PromptError::MissingDirectory(root.to_path_buf()));
    }

    debug!("Scanning directory structure in: {}", root.display());
    let mut records: Vec<DirectoryRecord> = Vec::new();
    let mut index_by_dir: HashMap<PathBuf, usize> = HashMap::new();

    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !matcher.is_ignored(e.path(), root));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();

        if entry.file_type().is_dir() {
            index_by_dir.insert(entry.path().to_path_buf(), records.len());
            records.push(DirectoryRecord {
                depth: entry.depth(),
                name,
                files: Vec::new(),
            });
            continue;
        }

        if entry.path_is_symlink() && entry.path().is_dir() {
            debug!("Not listing directory symlink: {}", entry.path().display());
            continue;
        }

        let parent = entry.path().parent().unwrap_or(root);
        match index_by_dir.get(parent) {
            Some(&idx) => records[idx].files.push(name),
            None => debug!("Orphan entry outside scanned dirs: {}", entry.path().display()),
        }
    }

    debug!("Found {} directories in structure", records.len());
    Ok(records)
}

/// Renders scan records as an indented tree.
pub fn format_directory_structure(records: &[DirectoryRecord], root: &str) -> String {
    let mut output = String::new();

    for (i, record) in records.iter().enumerate() {
        let indent = " ".repeat(4 * record.depth);
        if i == 0 {
            output.push_str(&format!("{}/\n", root.trim_end_matches(MAIN_SEPARATOR)));
        } else {
            output.push_str(&format!("{}{}/\n", indent, record.name));
        }

        let sub_indent = " ".repeat(4 * (record.depth + 1));
        for file in &record.files {
            output.push_str(&format!("{}{}\n", sub_indent, file));
        }
    }

    output
}

/// Remaps `work_directory`, scans it and formats the result under a heading.
///
/// Failures are rendered into the returned text so the interactive session
/// can carry on.
pub fn list_directory_structure(
    work_directory: &str,
    mapping: &FolderMapping,
    settings: &IgnoreSettings,
) -> String {
    let root = remap_top_folder(work_directory, &mapping.old_root, &mapping.new_root);
    info!("Generating directory structure for: {}", root);

    let matcher = IgnoreMatcher::from_settings(settings);
    match scan_directory(Path::new(&root), &matcher) {
        Ok(records) => format!(
            "# Directory Structure\n{}",
            format_directory_structure(&records, &root)
        ),
        Err(e) => {
            warn!("Directory structure unavailable: {}", e);
            format!("An error occurred: {}", e)
        }
    }
}

/// Expands a file, directory or glob token into existing file paths.
pub fn resolve_file_spec(spec: &str) -> Vec<PathBuf> {
    let path = Path::new(spec);

    if path.is_dir() {
        let mut files: Vec<PathBuf> = match fs::read_dir(path) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect(),
            Err(e) => {
                warn!("Could not list directory {}: {}", path.display(), e);
                Vec::new()
            }
        };
        files.sort();
        return files;
    }

    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    if !has_glob_chars(spec) {
        debug!("No file or directory named: {}", spec);
        return Vec::new();
    }

    match glob::glob_with(spec, SPEC_GLOB_OPTIONS) {
        Ok(paths) => paths
            .filter_map(|p| p.ok())
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            warn!("Invalid glob pattern '{}': {}", spec, e);
            Vec::new()
        }
    }
}

/// Reads a file as text, dropping undecodable bytes.
pub fn read_file_contents(path: &Path, sanitizer: &Sanitizer) -> std::io::Result<String> {
    debug!("Reading file contents: {}", path.display());
    let bytes = fs::read(path)?;
    debug!("Read {} bytes from file", bytes.len());
    Ok(sanitizer.decode(&bytes))
}
