use log::warn;
use std::ffi::OsStr;

const DECODE_WARNING: &str = "Some characters were removed due to decode errors.";
const ENCODE_WARNING: &str = "Some characters in string were removed due to encode errors.";

/// Input accepted by [`Sanitizer::sanitize`].
#[derive(Debug, Clone, Copy)]
pub enum RawText<'a> {
    Bytes(&'a [u8]),
    Text(&'a OsStr),
}

impl<'a> From<&'a [u8]> for RawText<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        RawText::Bytes(bytes)
    }
}

impl<'a> From<&'a OsStr> for RawText<'a> {
    fn from(text: &'a OsStr) -> Self {
        RawText::Text(text)
    }
}

impl<'a> From<&'a str> for RawText<'a> {
    fn from(text: &'a str) -> Self {
        RawText::Text(OsStr::new(text))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    /// Set when invalid sequences had to be dropped.
    pub removed: bool,
}

fn log_loss(message: &str) {
    warn!("{}", message);
}

/// Best-effort UTF-8 conversion that drops what it cannot decode.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    pub warn_on_loss: bool,
    /// Receives the loss warning; logs at `warn` level outside of tests.
    report: fn(&str),
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            warn_on_loss: true,
            report: log_loss,
        }
    }
}

impl Sanitizer {
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self {
            warn_on_loss: false,
            ..Self::default()
        }
    }

    pub fn sanitize<'a>(&self, raw: impl Into<RawText<'a>>) -> Sanitized {
        match raw.into() {
            RawText::Bytes(bytes) => self.finish(drop_invalid(bytes), DECODE_WARNING),
            RawText::Text(text) => match text.to_str() {
                Some(valid) => Sanitized {
                    text: valid.to_string(),
                    removed: false,
                },
                None => self.finish(os_str_lossy(text), ENCODE_WARNING),
            },
        }
    }

    /// Shorthand for byte input when only the text is needed.
    pub fn decode(&self, bytes: &[u8]) -> String {
        self.sanitize(bytes).text
    }

    fn finish(&self, sanitized: Sanitized, message: &str) -> Sanitized {
        if sanitized.removed && self.warn_on_loss {
            (self.report)(message);
        }
        sanitized
    }
}

fn drop_invalid(bytes: &[u8]) -> Sanitized {
    if let Ok(valid) = std::str::from_utf8(bytes) {
        return Sanitized {
            text: valid.to_string(),
            removed: false,
        };
    }

    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    Sanitized {
        text,
        removed: true,
    }
}

#[cfg(unix)]
fn os_str_lossy(text: &OsStr) -> Sanitized {
    use std::os::unix::ffi::OsStrExt;
    let mut sanitized = drop_invalid(text.as_bytes());
    sanitized.removed = true;
    sanitized
}

#[cfg(not(unix))]
fn os_str_lossy(text: &OsStr) -> Sanitized {
    let text = text
        .to_string_lossy()
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect();
    Sanitized {
        text,
        removed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static REPORTED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn record(message: &str) {
        REPORTED.with(|r| r.borrow_mut().push(message.to_string()));
    }

    fn take_reported() -> Vec<String> {
        REPORTED.with(|r| r.borrow_mut().drain(..).collect())
    }

    fn recording() -> Sanitizer {
        Sanitizer {
            report: record,
            ..Sanitizer::default()
        }
    }

    #[test]
    fn test_loss_emits_decode_warning() {
        take_reported();
        let result = recording().sanitize(&b"hello \xff world"[..]);

        assert_eq!(result.text, "hello  world");
        assert_eq!(take_reported(), vec![DECODE_WARNING]);
    }

    #[test]
    fn test_no_warning_without_loss_or_when_quiet() {
        take_reported();
        recording().sanitize("clean text");
        Sanitizer {
            warn_on_loss: false,
            ..recording()
        }
        .sanitize(&b"caf\xc3"[..]);

        assert!(take_reported().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_os_str_loss_emits_encode_warning() {
        use std::os::unix::ffi::OsStrExt;
        take_reported();
        recording().sanitize(OsStr::from_bytes(b"a\xffb"));

        assert_eq!(take_reported(), vec![ENCODE_WARNING]);
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        let result = Sanitizer::quiet().sanitize(&b"hello \xff world"[..]);
        assert_eq!(result.text, "hello  world");
        assert!(result.removed);
    }

    #[test]
    fn test_valid_bytes_unchanged() {
        let input = "こんにちは hello".as_bytes();
        let result = Sanitizer::default().sanitize(input);
        assert_eq!(result.text, "こんにちは hello");
        assert!(!result.removed);
    }

    #[test]
    fn test_truncated_multibyte_sequence() {
        // "é" is 0xC3 0xA9; a lone lead byte is dropped
        let result = Sanitizer::quiet().sanitize(&b"caf\xc3"[..]);
        assert_eq!(result.text, "caf");
        assert!(result.removed);
    }

    #[test]
    fn test_valid_text_unchanged() {
        let result = Sanitizer::quiet().sanitize("hello world");
        assert_eq!(result.text, "hello world");
        assert!(!result.removed);
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_os_str_is_cleaned() {
        use std::os::unix::ffi::OsStrExt;
        let raw = OsStr::from_bytes(b"hello \xed\xb3\xa2 world");
        let result = Sanitizer::quiet().sanitize(raw);
        assert_eq!(result.text, "hello  world");
        assert!(result.removed);
    }
}
