use std::path::PathBuf;

/// One visited directory of a structure scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub depth: usize,
    pub name: String,
    pub files: Vec<String>,
}

/// Maps the leading path segment typed by the user onto the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderMapping {
    pub old_root: String,
    pub new_root: String,
}

impl FolderMapping {
    pub fn new(old_root: impl Into<String>, new_root: impl Into<String>) -> Self {
        Self {
            old_root: old_root.into(),
            new_root: new_root.into(),
        }
    }
}

/// How the generated prompt asks the model for additional file paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeMode {
    /// Ask for paths only when the given code is not enough.
    #[default]
    Default,
    /// `!` marker: always ask for the needed paths before answering.
    ForcePathRequests,
    /// `@` marker: answer using the given code only.
    NoPathRequests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyValuePolicy {
    SubstituteBlank,
    #[default]
    DropLine,
}

/// How directory patterns (`name/`) are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirMatchPolicy {
    /// Compare the final path component with the pattern's base name.
    #[default]
    Basename,
    /// Require the path to be the directory or lie underneath it.
    Containment,
}

/// Behaviour switches for assembling a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssemblyPolicy {
    pub on_empty: EmptyValuePolicy,
}

#[derive(Debug, Clone)]
pub struct IgnoreSettings {
    /// Read `.gitignore` and `.dirignore` from `search_dir`.
    pub use_ignore_files: bool,
    pub search_dir: PathBuf,
    pub dir_match: DirMatchPolicy,
}

#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub mapping: FolderMapping,
    pub ignore: IgnoreSettings,
    pub policy: AssemblyPolicy,
    pub output_path: Option<PathBuf>,
    pub template: Option<String>,
    pub use_tui: bool,
}

/// Result of rendering a list of file specs as Markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeCollection {
    pub markdown: String,
    pub not_found: Vec<String>,
    pub mode: CodeMode,
}
