// Response presenter: turns an `Outcome` into the text printed after each
// call. Colour is optional; the plain form is identical apart from escapes.

use crossterm::style::Stylize;
use serde_json::Value;
use std::fmt::Write;

use crate::outcome::Outcome;

#[derive(Debug, Clone, Default)]
pub struct PresentOptions {
    /// Masked token to show as `Authorization: Bearer <masked>`.
    pub auth_debug: Option<String>,
    pub color: bool,
}

/// Status line, optional masked auth line, then the body.
pub fn present(outcome: &Outcome, options: &PresentOptions) -> String {
    let mut out = String::new();
    out.push_str(&status_line(outcome, options.color));
    out.push('\n');
    if let Some(masked) = &options.auth_debug {
        out.push_str(&auth_debug_line(masked, options.color));
        out.push('\n');
    }
    out.push_str(&render_json(outcome.body(), options.color));
    out
}

pub fn auth_debug_line(masked: &str, color: bool) -> String {
    if color {
        format!("{} Authorization: Bearer {masked}", "[auth-debug]".dim())
    } else {
        format!("[auth-debug] Authorization: Bearer {masked}")
    }
}

fn status_line(outcome: &Outcome, color: bool) -> String {
    let (level, message) = match outcome {
        Outcome::Success { status, .. } => (Level::Ok, format!("HTTP {status}")),
        Outcome::ClientError { status: 429, .. } => {
            (Level::Warn, "HTTP 429 (rate limited)".to_string())
        }
        Outcome::ClientError { status, .. } => {
            let why = match status {
                401 => " (unauthenticated: check the API key)",
                403 => " (forbidden)",
                404 => " (not found)",
                _ => "",
            };
            (Level::Error, format!("HTTP {status}{why}"))
        }
        Outcome::ServerError { status, .. } => (Level::Error, format!("HTTP {status}")),
        Outcome::Redirected { status, location, .. } => (
            Level::Warn,
            match location {
                Some(loc) => format!("HTTP {status} redirect to {loc} not followed"),
                None => format!("HTTP {status} redirect not followed"),
            },
        ),
        Outcome::Timeout { after, .. } => (
            Level::Error,
            format!("request timed out after {}s", after.as_secs()),
        ),
        Outcome::TransportFailure { .. } => (Level::Error, "request failed to send".to_string()),
        Outcome::UnsafeOrigin { url, .. } => {
            (Level::Error, format!("refusing unsafe origin {url:?}"))
        }
    };
    level.tag(&message, color)
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Warn,
    Error,
}

impl Level {
    fn tag(self, message: &str, color: bool) -> String {
        let label = match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        if !color {
            return format!("{label}: {message}");
        }
        let label = match self {
            Self::Ok => label.green(),
            Self::Warn => label.yellow(),
            Self::Error => label.red(),
        };
        format!("{label}: {message}")
    }
}

/// Local notices printed by the dispatcher (validation, session changes).
pub fn notice(ok: bool, message: &str, color: bool) -> String {
    if ok {
        Level::Ok.tag(message, color)
    } else {
        Level::Error.tag(message, color)
    }
}

pub fn warning(message: &str, color: bool) -> String {
    Level::Warn.tag(message, color)
}

/// Two-space indented JSON; with colour, keys cyan, strings green, numbers
/// magenta, booleans/null yellow, punctuation dark grey.
pub fn render_json(value: &Value, color: bool) -> String {
    if !color {
        return serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    }
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => push_styled(out, "null".yellow()),
        Value::Bool(b) => push_styled(out, b.to_string().yellow()),
        Value::Number(n) => push_styled(out, n.to_string().magenta()),
        Value::String(s) => push_styled(out, quote(s).green()),
        Value::Array(items) if items.is_empty() => push_styled(out, "[]".dark_grey()),
        Value::Object(map) if map.is_empty() => push_styled(out, "{}".dark_grey()),
        Value::Array(items) => {
            push_styled(out, "[".dark_grey());
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    push_styled(out, ",".dark_grey());
                }
                newline(out, depth + 1);
                write_value(out, item, depth + 1);
            }
            newline(out, depth);
            push_styled(out, "]".dark_grey());
        }
        Value::Object(map) => {
            push_styled(out, "{".dark_grey());
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    push_styled(out, ",".dark_grey());
                }
                newline(out, depth + 1);
                push_styled(out, quote(key).cyan());
                push_styled(out, ":".dark_grey());
                out.push(' ');
                write_value(out, item, depth + 1);
            }
            newline(out, depth);
            push_styled(out, "}".dark_grey());
        }
    }
}

fn push_styled(out: &mut String, styled: impl std::fmt::Display) {
    let _ = write!(out, "{styled}");
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    out.push_str(&"  ".repeat(depth));
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}
