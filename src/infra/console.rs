use crate::infra::sanitize::Sanitizer;
#[cfg(test)]
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// One read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    EndOfInput,
}

/// Line-oriented interaction with the user.
pub trait Console {
    fn say(&mut self, message: &str);

    /// Shows `prompt` (without newline) and reads one line, newline stripped.
    fn read_line(&mut self, prompt: &str) -> io::Result<Line>;

    /// Reads lines until end of input.
    fn read_lines(&mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Line::Text(line) = self.read_line("")? {
            lines.push(line);
        }
        Ok(lines)
    }
}

/// Reads answers from stdin; prompts and messages go to stderr so stdout
/// only ever carries the finished prompt.
pub struct StdinConsole {
    sanitizer: Sanitizer,
}

impl StdinConsole {
    pub fn new(sanitizer: Sanitizer) -> Self {
        Self { sanitizer }
    }
}

impl Console for StdinConsole {
    fn say(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Line> {
        if !prompt.is_empty() {
            let mut stderr = io::stderr();
            write!(stderr, "{}", prompt)?;
            stderr.flush()?;
        }

        let mut buf = Vec::new();
        let read = io::stdin().lock().read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(Line::EndOfInput);
        }

        let line = self.sanitizer.decode(&buf);
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Line::Text(line.to_string()))
    }
}

/// Replays canned answers.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<Line>,
    pub transcript: Vec<String>,
}

#[cfg(test)]
impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| Line::Text(a.into())).collect(),
            transcript: Vec::new(),
        }
    }

    /// Queues an end-of-input marker after the answers pushed so far.
    pub fn then_end(mut self) -> Self {
        self.answers.push_back(Line::EndOfInput);
        self
    }

    pub fn then<S: Into<String>>(mut self, answer: S) -> Self {
        self.answers.push_back(Line::Text(answer.into()));
        self
    }
}

#[cfg(test)]
impl Console for ScriptedConsole {
    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Line> {
        if !prompt.is_empty() {
            self.transcript.push(prompt.to_string());
        }
        Ok(self.answers.pop_front().unwrap_or(Line::EndOfInput))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_stops_at_end_of_input() {
        let mut console = ScriptedConsole::new(["first", "second"]).then_end().then("later");

        assert_eq!(console.read_lines().unwrap(), vec!["first", "second"]);
        assert_eq!(console.read_line("").unwrap(), Line::Text("later".to_string()));
        assert_eq!(console.read_line("").unwrap(), Line::EndOfInput);
    }

    #[test]
    fn test_scripted_console_records_prompts() {
        let mut console = ScriptedConsole::new(["y"]);
        console.say("hello");
        console.read_line("Continue? ").unwrap();

        assert_eq!(console.transcript, vec!["hello", "Continue? "]);
    }
}
