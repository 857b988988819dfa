use crate::core::prompt_assembler::PromptAssembler;
use crate::core::template_selector::select_template;
use crate::core::templates::validate_catalogue;
use crate::domain::models::{
    AssemblyPolicy, DirMatchPolicy, EmptyValuePolicy, FolderMapping, IgnoreSettings, PromptConfig,
};
use crate::infra::console::StdinConsole;
use crate::infra::file_system::{OUTPUT_DIR, OUTPUT_FILE};
use crate::infra::logger::{print_welcome_message, setup_logger};
use crate::infra::output::write_output;
use crate::infra::sanitize::Sanitizer;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnEmpty {
    DropLine,
    SubstituteBlank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirMatch {
    Basename,
    Containment,
}

#[derive(Parser)]
#[command(name = "prompt-assist")]
#[command(about = "Assemble an LLM prompt from a template, source files and a directory listing", long_about = None)]
pub struct Cli {
    /// Leading folder name in typed paths that is replaced by --new_folder
    #[arg(long = "old_folder", default_value = "src")]
    pub old_folder: String,

    /// Project root the old folder maps to (defaults to the parent of the executable's directory)
    #[arg(long = "new_folder")]
    pub new_folder: Option<String>,

    /// Do not read .gitignore / .dirignore when listing directories
    #[arg(long = "include_ignore")]
    pub include_ignore: bool,

    /// Template name or number (1-5); skips the interactive choice
    #[arg(long)]
    pub template: Option<String>,

    #[arg(long, value_enum, default_value_t = OnEmpty::DropLine)]
    pub on_empty: OnEmpty,

    #[arg(long, value_enum, default_value_t = DirMatch::Basename)]
    pub dir_match: DirMatch,

    /// Output file (defaults to <new_folder>/.prompt_assist/prompt.md)
    #[arg(long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the prompt instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Use the numbered menu instead of the list picker
    #[arg(long)]
    pub no_tui: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn default_new_folder() -> String {
    let exe_parent = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf));

    exe_parent
        .or_else(|| std::env::current_dir().ok())
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<PromptConfig> {
        let new_root = self.new_folder.unwrap_or_else(default_new_folder);
        let dir_match = match self.dir_match {
            DirMatch::Basename => DirMatchPolicy::Basename,
            DirMatch::Containment => DirMatchPolicy::Containment,
        };
        let on_empty = match self.on_empty {
            OnEmpty::DropLine => EmptyValuePolicy::DropLine,
            OnEmpty::SubstituteBlank => EmptyValuePolicy::SubstituteBlank,
        };

        let output_path = if self.stdout {
            None
        } else {
            Some(
                self.output
                    .unwrap_or_else(|| Path::new(&new_root).join(OUTPUT_DIR).join(OUTPUT_FILE)),
            )
        };

        Ok(PromptConfig {
            mapping: FolderMapping::new(self.old_folder, new_root),
            ignore: IgnoreSettings {
                use_ignore_files: !self.include_ignore,
                search_dir: std::env::current_dir()?,
                dir_match,
            },
            policy: AssemblyPolicy { on_empty },
            output_path,
            template: self.template,
            use_tui: !self.no_tui && std::io::stdin().is_terminal(),
        })
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;
    validate_catalogue()?;

    let config = cli.into_config()?;
    debug!("Resolved configuration: {:?}", config);

    generate_prompt(&config)
}

fn generate_prompt(config: &PromptConfig) -> anyhow::Result<()> {
    print_welcome_message()?;

    let sanitizer = Sanitizer::default();
    let mut console = StdinConsole::new(sanitizer);

    let kind = select_template(config.template.as_deref(), config.use_tui, &mut console)?;

    info!("Collecting values for '{}'", kind.name());
    let prompt = PromptAssembler::new(
        &mut console,
        &config.mapping,
        &config.ignore,
        config.policy,
        sanitizer,
    )
    .assemble(kind)?;

    info!("Writing output");
    write_output(&prompt, config.output_path.as_ref())
}
