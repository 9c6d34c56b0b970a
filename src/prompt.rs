// Operator input: a small `Prompter` trait so the dispatcher and the
// credential resolver can be driven by `dialoguer` in the terminal or by a
// scripted double in tests, plus the validation helpers applied to every
// value before it becomes part of a request.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Password};

use crate::error::{CliError, Result};

/// Largest file accepted for avatar/banner uploads.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Source of interactive answers.
pub trait Prompter {
    /// Free text. Blank input yields `default` (or an empty string).
    fn text(&mut self, label: &str, default: Option<&str>) -> Result<String>;

    /// Integer constrained to `min..=max`; re-asks until the value fits.
    fn integer(&mut self, label: &str, default: Option<u64>, min: u64, max: u64) -> Result<u64>;

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool>;

    /// Hidden input, never echoed.
    fn secret(&mut self, label: &str) -> Result<String>;

    /// Wait for the operator before redrawing the menu.
    fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    /// Optional text: `None` when left blank.
    fn optional_text(&mut self, label: &str) -> Result<Option<String>> {
        let value = self.text(label, None)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }
}

/// `Prompter` backed by `dialoguer` on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn text(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(label).allow_empty(true);
        if let Some(d) = default.filter(|d| !d.is_empty()) {
            input = input.default(d.to_string());
        }
        let value = input.interact_text()?;
        let value = value.trim();
        if value.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(value.to_string())
    }

    fn integer(&mut self, label: &str, default: Option<u64>, min: u64, max: u64) -> Result<u64> {
        let mut input = Input::<u64>::new()
            .with_prompt(label)
            .validate_with(move |n: &u64| -> std::result::Result<(), String> {
                if *n < min {
                    Err(format!("Value must be >= {min}"))
                } else if *n > max {
                    Err(format!("Value must be <= {max}"))
                } else {
                    Ok(())
                }
            });
        if let Some(d) = default {
            input = input.default(d);
        }
        Ok(input.interact_text()?)
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new().with_prompt(label).default(default).interact()?)
    }

    fn secret(&mut self, label: &str) -> Result<String> {
        Ok(Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()?)
    }

    fn pause(&mut self) -> Result<()> {
        Input::<String>::new()
            .with_prompt("Press Enter to continue")
            .allow_empty(true)
            .interact_text()?;
        Ok(())
    }
}

/// Agent and submolt names: 1-64 chars of `[A-Za-z0-9_-]`.
pub fn validate_name(label: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::validation(format!("{label} must not be empty")));
    }
    if value.chars().count() > 64 {
        return Err(CliError::validation(format!("{label} must be at most 64 characters")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CliError::validation(format!(
            "{label} may only contain letters, digits, '_' and '-'"
        )));
    }
    Ok(value.to_string())
}

/// Post, comment and conversation ids. They end up as a single path
/// segment, so separators and whitespace are rejected outright.
pub fn validate_id(label: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::validation(format!("{label} must not be empty")));
    }
    if value.len() > 128 {
        return Err(CliError::validation(format!("{label} is too long")));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c == '/' || c == '\\' || c == '?' || c == '#')
    {
        return Err(CliError::validation(format!(
            "{label} must not contain whitespace, '/', '\\', '?' or '#'"
        )));
    }
    if value == "." || value == ".." {
        return Err(CliError::validation(format!("{label} is not a valid id")));
    }
    Ok(value.to_string())
}

/// Non-empty free text with an upper bound in characters.
pub fn validate_text(label: &str, value: &str, max_chars: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::validation(format!("{label} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(CliError::validation(format!(
            "{label} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

/// Link target for link posts.
pub fn validate_url(value: &str) -> Result<String> {
    let value = value.trim();
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(value.to_string())
        }
        _ => Err(CliError::validation("URL must be an absolute http(s) URL")),
    }
}

/// Image file for avatar/banner uploads.
pub fn validate_upload_file(value: &str) -> Result<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::validation("file path must not be empty"));
    }
    let path = Path::new(value);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CliError::validation(format!(
            "unsupported image type; expected one of: {}",
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    let meta = std::fs::metadata(path)
        .map_err(|e| CliError::validation(format!("cannot read {}: {e}", path.display())))?;
    if !meta.is_file() {
        return Err(CliError::validation(format!("{} is not a file", path.display())));
    }
    if meta.len() > MAX_UPLOAD_BYTES {
        return Err(CliError::validation(format!(
            "{} is larger than {} bytes",
            path.display(),
            MAX_UPLOAD_BYTES
        )));
    }
    Ok(path.to_path_buf())
}

/// Pre-recorded answers for driving prompts in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub(crate) asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    fn next(&mut self, label: &str) -> Result<String> {
        self.asked.push(label.to_string());
        self.answers.pop_front().ok_or_else(|| {
            CliError::Prompt(dialoguer::Error::IO(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for {label:?}"),
            )))
        })
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn text(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let value = self.next(label)?;
        let value = value.trim();
        if value.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(value.to_string())
    }

    fn integer(&mut self, label: &str, default: Option<u64>, min: u64, max: u64) -> Result<u64> {
        let value = self.next(label)?;
        if value.trim().is_empty() {
            if let Some(d) = default {
                return Ok(d);
            }
        }
        let n: u64 = value
            .trim()
            .parse()
            .map_err(|_| CliError::validation(format!("{label}: not a number")))?;
        if n < min || n > max {
            return Err(CliError::validation(format!("{label}: out of range")));
        }
        Ok(n)
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let value = self.next(label)?;
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "" => default,
            v => v.starts_with('y'),
        })
    }

    fn secret(&mut self, label: &str) -> Result<String> {
        self.next(label)
    }
}
