pub mod code_markdown;
pub mod placeholders;
pub mod prompt_assembler;
pub mod template_selector;
pub mod templates;
