use crate::domain::errors::PromptError;
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to file: {}", self.path.display());
        let to_write_error = |source| PromptError::FileWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(to_write_error)?;
            }
        }
        fs::write(&self.path, content).map_err(to_write_error)?;

        info!("Output written to file: {}", self.path.display());
        Ok(())
    }
}

/// Writes the prompt to stdout. Nothing else in the program writes there.
pub struct ConsoleWriter;

impl ConsoleWriter {
    fn write_to<W: Write>(&self, out: &mut W, content: &str) -> io::Result<()> {
        out.write_all(content.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to console");
        self.write_to(&mut io::stdout().lock(), content)?;
        Ok(())
    }
}

pub fn create_writer(output_path: Option<&PathBuf>) -> Box<dyn OutputWriter> {
    match output_path {
        Some(path) => Box::new(FileWriter::new(path.clone())),
        None => Box::new(ConsoleWriter),
    }
}

/// Writes the prompt and confirms where it went.
pub fn write_output(content: &str, output_path: Option<&PathBuf>) -> anyhow::Result<()> {
    let writer = create_writer(output_path);
    writer.write(content)?;

    if let Some(path) = output_path {
        let mut stderr = io::stderr();
        stderr.execute(SetForegroundColor(Color::Green))?;
        writeln!(stderr, "\nPrompt saved to {}", path.display())?;
        stderr.execute(ResetColor)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_writer_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".prompt_assist").join("prompt.md");
        let writer = FileWriter::new(path.clone());

        writer.write("Test output").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "Test output");
    }

    #[test]
    fn test_file_writer_reports_path_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let writer = FileWriter::new(blocker.join("prompt.md"));

        let err = writer.write("x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PromptError>(),
            Some(PromptError::FileWrite { .. })
        ));
    }

    #[test]
    fn test_console_writer_payload_is_exactly_the_prompt() {
        let prompt = "# Relevant code\n\n## File main.py\n```\nprint('hi')\n```\n";
        let mut out = Vec::new();

        ConsoleWriter.write_to(&mut out, prompt).unwrap();

        assert_eq!(out, format!("{}\n", prompt).into_bytes());
    }

    #[test]
    fn test_write_output_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.md");

        write_output("# Prompt", Some(&path)).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "# Prompt");
    }
}
