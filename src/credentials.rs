// API key handling: sanitization of pasted keys, masking for display, and
// resolution from session / environment / credentials file / hidden prompt.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::{debug, warn};

use crate::config::EXPECTED_KEY_PREFIX;
use crate::error::{CliError, Result};
use crate::prompt::Prompter;
use crate::store::CredentialRecord;

/// Characters clipboards like to smuggle into pasted keys.
const INVISIBLE_CHARS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Normalize a key as pasted by a human.
///
/// Removes zero-width/BOM characters and all whitespace (keys never
/// contain any), then strips enclosing `"…"` / `'…'` pairs. Applying it
/// twice gives the same result as applying it once.
pub fn sanitize_api_key(raw: &str) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| !INVISIBLE_CHARS.contains(c) && !c.is_whitespace())
        .collect();

    while s.len() >= 2 {
        let first = s.chars().next();
        let last = s.chars().next_back();
        match (first, last) {
            (Some(a), Some(b)) if a == b && (a == '"' || a == '\'') => {
                s = s[1..s.len() - 1].to_string();
            }
            _ => break,
        }
    }
    s
}

/// Display form of a key: a few boundary characters around an ellipsis.
/// Keys too short to keep any character hidden are not shown at all.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let n = chars.len();
    if n == 0 {
        return "<empty>".to_string();
    }
    if n <= 4 {
        return "<short>".to_string();
    }
    let (head, tail) = if n <= 12 { (2, 2) } else { (8, 4) };
    let prefix: String = chars[..head].iter().collect();
    let suffix: String = chars[n - tail..].iter().collect();
    format!("{prefix}…{suffix}")
}

/// A sanitized, non-empty bearer token.
///
/// The raw value stays inside a `SecretString`; `Debug` and `Display`
/// only ever show the masked form.
#[derive(Clone)]
pub struct Credential {
    token: SecretString,
}

impl Credential {
    /// Sanitize `raw`; `None` if nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = sanitize_api_key(raw);
        if key.is_empty() {
            return None;
        }
        Some(Self {
            token: SecretString::new(key.into()),
        })
    }

    pub fn masked(&self) -> String {
        mask_key(self.token.expose_secret())
    }

    pub fn has_expected_prefix(&self) -> bool {
        self.token.expose_secret().starts_with(EXPECTED_KEY_PREFIX)
    }

    /// The raw token, for building the Authorization header and for
    /// writing the credentials file. Never log this.
    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Session,
    Environment,
    CredentialFile,
    Prompt,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Session => "session",
            Self::Environment => "environment",
            Self::CredentialFile => "credentials file",
            Self::Prompt => "prompt",
        };
        f.write_str(s)
    }
}

/// Candidate values, highest precedence first.
#[derive(Debug, Default)]
pub struct CredentialSources {
    pub session: Option<Credential>,
    pub env_value: Option<String>,
    pub stored: Option<CredentialRecord>,
}

#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub source: CredentialSource,
}

/// Pick the first usable key: session override, environment, credentials
/// file, then a hidden prompt when `prompter` is available.
pub fn resolve(
    sources: CredentialSources,
    prompter: Option<&mut dyn Prompter>,
) -> Result<ResolvedCredential> {
    if let Some(credential) = sources.session {
        return Ok(found(credential, CredentialSource::Session));
    }

    if let Some(credential) = sources.env_value.as_deref().and_then(Credential::parse) {
        return Ok(found(credential, CredentialSource::Environment));
    }

    if let Some(credential) = sources
        .stored
        .as_ref()
        .and_then(|r| Credential::parse(&r.api_key))
    {
        return Ok(found(credential, CredentialSource::CredentialFile));
    }

    let Some(prompter) = prompter else {
        return Err(CliError::MissingCredential);
    };
    let raw = prompter.secret("Enter Moltbook API key (input hidden)")?;
    match Credential::parse(&raw) {
        Some(credential) => Ok(found(credential, CredentialSource::Prompt)),
        None => Err(CliError::MissingCredential),
    }
}

fn found(credential: Credential, source: CredentialSource) -> ResolvedCredential {
    debug!(source = %source, key = %credential.masked(), "Resolved API key");
    if !credential.has_expected_prefix() {
        warn!("API key does not start with '{EXPECTED_KEY_PREFIX}'; proceeding anyway");
    }
    ResolvedCredential { credential, source }
}
