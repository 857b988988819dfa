use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = PromptError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PromptError {
    #[error("Template '{template}' uses placeholders outside the allow-list: {names}")]
    InvalidPlaceholders { template: String, names: String },

    #[error("'{}' does not exist. You should input full path.", .0.display())]
    MissingDirectory(PathBuf),

    #[error("File specs cannot contain both '@' and '!' markers")]
    ConflictingCodeMarkers,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template selection cancelled")]
    SelectionCancelled,

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
