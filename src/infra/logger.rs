use crossterm::{style::{Color, SetForegroundColor, ResetColor}, ExecutableCommand};
use env_logger::Builder;
use log::{debug, info, Level};
use std::io::Write;

pub const LOG_LEVEL_ENV: &str = "PROMPT_ASSIST_LOG_LEVEL";

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, level_for(verbosity));

    Builder::from_env(env)
        .format(|buf, record| {
            let level_color = match record.level() {
                Level::Error => "31", // Red
                Level::Warn => "33",  // Yellow
                Level::Info => "32",  // Green
                Level::Debug => "36", // Cyan
                Level::Trace => "35", // Magenta
            };

            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}",
                level_color,
                record.level(),
                buf.timestamp(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()
}

/// Prints the banner on stderr.
pub fn print_welcome_message() -> std::io::Result<()> {
    write_welcome_message(&mut std::io::stderr())
}

fn write_welcome_message<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out)?;
    out.execute(SetForegroundColor(Color::Cyan))?;
    writeln!(out, "Prompt Assist v{}", env!("CARGO_PKG_VERSION"))?;
    out.execute(ResetColor)?;
    writeln!(out, "Build LLM prompts from templates, code and directory listings")?;

    debug!("Debug logging enabled");
    info!("Starting Prompt Assist...");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[test]
    fn test_setup_logger() {
        INIT.call_once(|| {
            assert!(setup_logger(0).is_ok());
        });
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(5), "debug");
    }

    #[test]
    fn test_welcome_message_names_version() {
        let mut out = Vec::new();
        write_welcome_message(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("Prompt Assist v{}", env!("CARGO_PKG_VERSION"))));
    }
}
