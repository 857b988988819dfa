use crate::domain::errors::{PromptError, Result};
use crate::domain::models::{CodeCollection, CodeMode, FolderMapping};
use crate::infra::file_system::{read_file_contents, remap_top_folder, resolve_file_spec};
use crate::infra::sanitize::Sanitizer;
use log::{debug, info, warn};
use std::path::Path;

const NO_PATHS_MARKER: char = '@';
const FORCE_PATHS_MARKER: char = '!';

/// Splits marker characters off the typed specs and picks the code mode.
pub fn parse_code_specs(specs: &[String]) -> Result<(Vec<String>, CodeMode)> {
    let has_at = specs.iter().any(|s| s.contains(NO_PATHS_MARKER));
    let has_bang = specs.iter().any(|s| s.contains(FORCE_PATHS_MARKER));

    let (marker, mode) = match (has_at, has_bang) {
        (true, true) => return Err(PromptError::ConflictingCodeMarkers),
        (true, false) => (NO_PATHS_MARKER, CodeMode::NoPathRequests),
        (false, true) => (FORCE_PATHS_MARKER, CodeMode::ForcePathRequests),
        (false, false) => return Ok((specs.to_vec(), CodeMode::Default)),
    };

    let cleaned = specs
        .iter()
        .filter(|s| s.chars().any(|c| c != marker))
        .map(|s| s.replace(marker, ""))
        .collect();
    debug!("Code mode {:?} selected by '{}' marker", mode, marker);
    Ok((cleaned, mode))
}

pub fn add_markdown_block(markdown: &str, title: &str, code: &str) -> String {
    format!("{}\n## {}\n```\n{}\n```", markdown, title, code)
}

/// Resolves each spec and renders every file it names as a fenced block.
///
/// Specs that resolve to nothing and files that cannot be read end up in
/// `not_found` instead of failing the run.
pub fn render_code_markdown(
    specs: &[String],
    mapping: &FolderMapping,
    sanitizer: &Sanitizer,
) -> CodeCollection {
    let mut collection = CodeCollection::default();

    for spec in specs {
        let adjusted = remap_top_folder(spec, &mapping.old_root, &mapping.new_root);
        let files = resolve_file_spec(&adjusted);

        if files.is_empty() {
            warn!("No files found matching '{}'", spec);
            collection.not_found.push(adjusted);
            continue;
        }

        for file in files {
            match read_file_contents(&file, sanitizer) {
                Ok(code) => {
                    let name = file
                        .file_name()
                        .unwrap_or(file.as_os_str())
                        .to_string_lossy();
                    collection.markdown =
                        add_markdown_block(&collection.markdown, &format!("File {}", name), &code);
                }
                Err(e) => {
                    warn!("Error reading file {}: {}", file.display(), e);
                    collection.not_found.push(file.to_string_lossy().to_string());
                }
            }
        }
    }

    info!(
        "Rendered code from {} specs ({} not found)",
        specs.len(),
        collection.not_found.len()
    );
    collection
}

/// Bullet list used for the `not_found_files` value.
pub fn format_not_found(not_found: &[String]) -> String {
    not_found
        .iter()
        .map(|path| format!("- {}", Path::new(path).display()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn specs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_markdown_block() {
        let block = add_markdown_block("", "F.py", "x=1");
        assert!(block.contains("## F.py"));
        assert!(block.contains("```\nx=1\n```"));
    }

    #[test]
    fn test_blocks_accumulate_in_order() {
        let first = add_markdown_block("", "File a.rs", "fn a() {}");
        let both = add_markdown_block(&first, "File b.rs", "fn b() {}");
        assert!(both.find("a.rs").unwrap() < both.find("b.rs").unwrap());
    }

    #[test]
    fn test_parse_code_specs_markers() {
        let (cleaned, mode) = parse_code_specs(&specs(&["a.py", "b.py"])).unwrap();
        assert_eq!(cleaned, vec!["a.py", "b.py"]);
        assert_eq!(mode, CodeMode::Default);

        let (cleaned, mode) = parse_code_specs(&specs(&["@", "a.py", "@b.py"])).unwrap();
        assert_eq!(cleaned, vec!["a.py", "b.py"]);
        assert_eq!(mode, CodeMode::NoPathRequests);

        let (cleaned, mode) = parse_code_specs(&specs(&["!a.py"])).unwrap();
        assert_eq!(cleaned, vec!["a.py"]);
        assert_eq!(mode, CodeMode::ForcePathRequests);

        assert!(matches!(
            parse_code_specs(&specs(&["@a.py", "!b.py"])),
            Err(PromptError::ConflictingCodeMarkers)
        ));
    }

    #[test]
    fn test_render_code_markdown() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_string_lossy().to_string();
        fs::write(temp_dir.path().join("main.py"), "print('hi')").unwrap();
        let mapping = FolderMapping::new("src", root.clone());

        let collection = render_code_markdown(
            &specs(&["src/main.py", "src/missing.py"]),
            &mapping,
            &Sanitizer::quiet(),
        );

        assert!(collection.markdown.contains("## File main.py"));
        assert!(collection.markdown.contains("print('hi')"));
        assert_eq!(collection.not_found, vec![format!("{}/missing.py", root)]);
    }

    #[test]
    fn test_render_empty_input() {
        let mapping = FolderMapping::new("src", "/var/www");
        let collection = render_code_markdown(&[], &mapping, &Sanitizer::quiet());
        assert_eq!(collection.markdown, "");
        assert!(collection.not_found.is_empty());
    }

    #[test]
    fn test_format_not_found() {
        assert_eq!(
            format_not_found(&specs(&["/var/www/a.py", "/var/www/b.py"])),
            "- /var/www/a.py\n- /var/www/b.py"
        );
    }
}
