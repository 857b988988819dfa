use crate::core::code_markdown::{format_not_found, parse_code_specs, render_code_markdown};
use crate::core::placeholders::{InputValues, Placeholder, extract_placeholders, substitute};
use crate::core::templates::{
    TemplateKind, conditional_file_path_request_prompt, file_path_request_prompt,
    not_found_files_prompt,
};
use crate::domain::errors::Result;
use crate::domain::models::{
    AssemblyPolicy, CodeCollection, CodeMode, FolderMapping, IgnoreSettings,
};
use crate::infra::console::{Console, Line};
use crate::infra::file_system::list_directory_structure;
use crate::infra::sanitize::Sanitizer;
use log::{debug, info};

const CODE_HINT: &str = "[Hint]
Enter file names separated by spaces or newlines. An empty line finishes the list.
Prefix a name with @ to make the model work with the given code only (no file path requests),
or with ! to make the model always ask for the file paths it needs first.
";

const DIRECTORY_QUESTION: &str = "Include the directory structure? y(default)/n/specific path: ";

/// Gathers placeholder values from the user and fills a template.
pub struct PromptAssembler<'a> {
    console: &'a mut dyn Console,
    mapping: &'a FolderMapping,
    ignore: &'a IgnoreSettings,
    policy: AssemblyPolicy,
    sanitizer: Sanitizer,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(
        console: &'a mut dyn Console,
        mapping: &'a FolderMapping,
        ignore: &'a IgnoreSettings,
        policy: AssemblyPolicy,
        sanitizer: Sanitizer,
    ) -> Self {
        Self {
            console,
            mapping,
            ignore,
            policy,
            sanitizer,
        }
    }

    pub fn assemble(&mut self, kind: TemplateKind) -> Result<String> {
        info!("Assembling '{}' prompt", kind.name());
        self.assemble_text(kind.text())
    }

    pub fn assemble_text(&mut self, template: &str) -> Result<String> {
        let required = extract_placeholders(template)?;
        debug!("Template requires {:?}", required);

        let mut values = InputValues::default();
        let mut code = CodeCollection::default();

        for placeholder in required.iter().copied().filter(|p| !p.is_derived()) {
            let value = match placeholder {
                Placeholder::Code => {
                    code = self.collect_code()?;
                    code.markdown.clone()
                }
                Placeholder::Error | Placeholder::Input => self.collect_text(placeholder)?,
                Placeholder::DirectoryStructure => self.collect_directory_structure()?,
                _ => String::new(),
            };
            values.insert(placeholder, self.sanitizer.sanitize(value.as_str()).text);
        }

        self.insert_derived(&mut values, &code);
        debug!("Substituting {} values", values.len());
        Ok(substitute(template, &values, self.policy.on_empty))
    }

    fn insert_derived(&self, values: &mut InputValues, code: &CodeCollection) {
        let root = self.mapping.new_root.as_str();
        let (conditional, request) = match code.mode {
            CodeMode::Default => (conditional_file_path_request_prompt(root), String::new()),
            CodeMode::ForcePathRequests => (
                conditional_file_path_request_prompt(root),
                file_path_request_prompt(root),
            ),
            CodeMode::NoPathRequests => (String::new(), String::new()),
        };
        values.insert(Placeholder::ConditionalFilePathRequestPrompt, conditional);
        values.insert(Placeholder::FilePathRequestPrompt, request);

        if code.not_found.is_empty() {
            values.insert(Placeholder::NotFoundFiles, "");
            values.insert(Placeholder::NotFoundFilesPrompt, "");
        } else {
            let list = format_not_found(&code.not_found);
            values.insert(Placeholder::NotFoundFilesPrompt, not_found_files_prompt(&list));
            values.insert(Placeholder::NotFoundFiles, list);
        }
    }

    fn collect_code(&mut self) -> Result<CodeCollection> {
        self.console.say(CODE_HINT);

        let mut specs = Vec::new();
        loop {
            match self.console.read_line("")? {
                Line::Text(line) if !line.trim().is_empty() => {
                    specs.extend(line.split_whitespace().map(str::to_string));
                }
                _ => break,
            }
        }

        if specs.is_empty() {
            debug!("No file specs entered");
            return Ok(CodeCollection::default());
        }

        let (specs, mode) = parse_code_specs(&specs)?;
        let mut collection = render_code_markdown(&specs, self.mapping, &self.sanitizer);
        collection.mode = mode;

        for missing in &collection.not_found {
            self.console
                .say(&format!("Warning: no file found for '{}'.", missing));
        }
        Ok(collection)
    }

    fn collect_text(&mut self, placeholder: Placeholder) -> Result<String> {
        self.console.say(&format!(
            "Enter {}. Finish with Ctrl+D (end of input):",
            placeholder.as_str()
        ));
        let lines = self.console.read_lines()?;
        Ok(lines.join("\n") + "\n")
    }

    fn collect_directory_structure(&mut self) -> Result<String> {
        let answer = match self.console.read_line(DIRECTORY_QUESTION)? {
            Line::Text(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            _ => "y".to_string(),
        };

        let target = match answer.to_lowercase().as_str() {
            "y" => self.mapping.old_root.clone(),
            "n" => return Ok(String::new()),
            _ => answer,
        };
        Ok(list_directory_structure(&target, self.mapping, self.ignore))
    }
}
