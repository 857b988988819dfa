use crate::core::placeholders::extract_placeholders;
use crate::domain::errors::{PromptError, Result};
use log::debug;
use std::str::FromStr;

const REVIEW_TEMPLATE: &str = "# Instructions
1. Explain the attached code step by step.
2. Review the code and list concerns together with suggested fixes.
3. Write test code that checks the code behaves correctly.
{conditional_file_path_request_prompt}
# Explanation constraints
Keep it easy to follow
Walk through the code from top to bottom so the data flow is clear
Show concrete behaviour by plugging in example values
Explain the arguments as well
Point out anything inappropriate in the code

# Review constraints
Aim for one function per responsibility
Merge functions that can be merged
Propose concise, readable code
Give concrete examples when explaining
Look up documentation where needed

# Test code constraints
Test the code as it is before any fix
Add tests that confirm the review findings
Report the cause of any problem the tests reveal

{directory_structure}
# Relevant code
{code}
{not_found_files_prompt}
";

const REVISE_TEMPLATE: &str = "# Instructions
{file_path_request_prompt}Modify or create code according to the change request below.

# Constraints
Keep it as concise as possible
Comment out functions that are no longer needed instead of deleting them
{conditional_file_path_request_prompt}
# Change request
{input}
{directory_structure}
# Relevant code
{code}
{not_found_files_prompt}
";

const ERROR_TEMPLATE: &str = "# Instructions
{file_path_request_prompt}Analyse the attached code and error output and suggest how to resolve it.

# Constraints
Identify the cause of the error
Keep it easy to follow
Give concrete examples
Also point out inappropriate code that is not directly related to the error
{conditional_file_path_request_prompt}
# Error output
{error}
{directory_structure}

# Relevant code
{code}
{not_found_files_prompt}
";

const ASK_TEMPLATE: &str = "# Instructions
Refer to the attached code and answer the question below.
{conditional_file_path_request_prompt}
# Question
{input}
{directory_structure}

# Relevant code
{code}
{not_found_files_prompt}
";

const CODE_TEMPLATE: &str = "# Relevant code
{code}
{not_found_files_prompt}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Review,
    Revise,
    Error,
    Ask,
    Code,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::Review,
        TemplateKind::Revise,
        TemplateKind::Error,
        TemplateKind::Ask,
        TemplateKind::Code,
    ];

    pub fn number(self) -> usize {
        match self {
            TemplateKind::Review => 1,
            TemplateKind::Revise => 2,
            TemplateKind::Error => 3,
            TemplateKind::Ask => 4,
            TemplateKind::Code => 5,
        }
    }

    pub fn from_number(number: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.number() == number)
    }

    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Review => "review",
            TemplateKind::Revise => "revise",
            TemplateKind::Error => "error",
            TemplateKind::Ask => "ask",
            TemplateKind::Code => "code",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TemplateKind::Review => "Code review",
            TemplateKind::Revise => "Modify or create code",
            TemplateKind::Error => "Error analysis",
            TemplateKind::Ask => "Question about the code",
            TemplateKind::Code => "Code only",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            TemplateKind::Review => REVIEW_TEMPLATE,
            TemplateKind::Revise => REVISE_TEMPLATE,
            TemplateKind::Error => ERROR_TEMPLATE,
            TemplateKind::Ask => ASK_TEMPLATE,
            TemplateKind::Code => CODE_TEMPLATE,
        }
    }
}

impl FromStr for TemplateKind {
    type Err = PromptError;

    /// Accepts a template name or its menu number.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(number) = s.parse::<usize>() {
            return Self::from_number(number).ok_or_else(|| PromptError::UnknownTemplate(s.into()));
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PromptError::UnknownTemplate(s.into()))
    }
}

/// Checks every template against the placeholder allow-list.
pub fn validate_catalogue() -> Result<()> {
    for kind in TemplateKind::ALL {
        let names = extract_placeholders(kind.text()).map_err(|e| match e {
            PromptError::InvalidPlaceholders { names, .. } => PromptError::InvalidPlaceholders {
                template: kind.name().to_string(),
                names,
            },
            other => other,
        })?;
        debug!("Template '{}' uses {} placeholders", kind.name(), names.len());
    }
    Ok(())
}

pub fn file_path_request_prompt(root: &str) -> String {
    format!(
        "Using the directory structure and the code (if any) as a reference, work out which files are needed \
and output their full paths starting with {root} on **a single line separated by spaces**. \
I will then provide the contents of those files.
Carry out the instructions below only **after** the files have been provided.
Request a set of files that is comprehensive enough to carry out these instructions.
"
    )
}

pub fn conditional_file_path_request_prompt(root: &str) -> String {
    format!(
        "If you need further files, output their full paths starting with {root} on **a single line separated by spaces**.
If you already have enough information, start answering right away.
"
    )
}

pub fn not_found_files_prompt(not_found_files: &str) -> String {
    format!(
        "# Files that could not be provided
The following files were requested but could not be found or read, so they are not included above:
{not_found_files}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_valid() {
        assert!(validate_catalogue().is_ok());
    }

    #[test]
    fn test_template_kind_from_str() {
        assert_eq!("1".parse::<TemplateKind>().unwrap(), TemplateKind::Review);
        assert_eq!("Ask".parse::<TemplateKind>().unwrap(), TemplateKind::Ask);
        assert!("6".parse::<TemplateKind>().is_err());
        assert!("bogus".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_numbers_round_trip() {
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::from_number(kind.number()), Some(kind));
        }
    }

    #[test]
    fn test_request_prompts_mention_root() {
        assert!(file_path_request_prompt("/var/www").contains("/var/www"));
        assert!(conditional_file_path_request_prompt("/srv/app").contains("/srv/app"));
    }
}
