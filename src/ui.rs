// UI layer: the menu loop and the dispatcher that turns one numbered
// selection into prompts, one API call and the printed result.
//
// All state lives in `Session`, which is handed to every action; nothing
// here is global, so the loop can be driven by a scripted prompter and an
// in-memory transport in tests.

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiRequest};
use crate::config::{SessionConfig, EXPECTED_KEY_PREFIX, MAX_TIMEOUT_SECS};
use crate::credentials::Credential;
use crate::endpoints::{self, PostKind};
use crate::error::{CliError, Result};
use crate::menu::{self, Action};
use crate::outcome::Outcome;
use crate::output::{self, PresentOptions};
use crate::prompt::{
    validate_id, validate_name, validate_text, validate_upload_file, validate_url, Prompter,
};
use crate::store::{CredentialRecord, CredentialStore};

const MAX_TITLE: usize = 300;
const MAX_CONTENT: usize = 40_000;
const MAX_COMMENT: usize = 10_000;
const MAX_MESSAGE: usize = 10_000;
const MAX_DESCRIPTION: usize = 500;
const MAX_DISPLAY_NAME: usize = 100;
const MAX_QUERY: usize = 500;

/// Everything an action may read or change.
#[derive(Debug)]
pub struct Session {
    pub client: ApiClient,
    pub credential: Credential,
    pub config: SessionConfig,
    pub store: CredentialStore,
    pub color: bool,
}

/// What the loop should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

/// Main interactive loop. Blocks until the operator picks Exit.
pub fn run(session: &mut Session, prompter: &mut dyn Prompter, out: &mut dyn Write) -> Result<()> {
    loop {
        writeln!(out)?;
        write!(out, "{}", menu::render(session.color))?;
        let n = prompter.integer("Select", None, 0, u64::from(menu::max_number()))?;
        let Some(action) = u32::try_from(n).ok().and_then(Action::from_number) else {
            writeln!(out, "{}", output::warning("Unknown selection.", session.color))?;
            continue;
        };

        match dispatch(action, session, prompter, out) {
            Ok(Step::Exit) => {
                writeln!(out, "Exiting.")?;
                return Ok(());
            }
            Ok(Step::Continue) => {}
            Err(e) if e.is_recoverable() => {
                writeln!(out, "{}", output::notice(false, &e.to_string(), session.color))?;
            }
            Err(e) => return Err(e),
        }
        prompter.pause()?;
    }
}

/// Run one menu action. Validation failures surface as
/// `CliError::Validation` before anything is sent.
pub fn dispatch(
    action: Action,
    session: &mut Session,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<Step> {
    match action {
        Action::Exit => return Ok(Step::Exit),
        Action::SwitchKey => switch_key(session, prompter, out)?,
        Action::SaveKey => {
            let record = record_for_current_key(session);
            persist(session, &record, out)?;
        }
        Action::SetTimeout => {
            let current = session.config.timeout.as_secs();
            let secs = prompter.integer(
                "Timeout in seconds",
                Some(current),
                1,
                MAX_TIMEOUT_SECS,
            )?;
            let timeout = session.config.set_timeout_secs(secs)?;
            let msg = format!("Request timeout set to {}s", timeout.as_secs());
            writeln!(out, "{}", output::notice(true, &msg, session.color))?;
        }
        Action::ToggleAuthDebug => {
            let on = session.config.toggle_auth_debug();
            let msg = format!("Auth debug {}", if on { "enabled" } else { "disabled" });
            writeln!(out, "{}", output::notice(true, &msg, session.color))?;
        }
        Action::ShowSettings => show_settings(session, out)?,
        Action::Register => {
            let (request, name) = register_request(prompter)?;
            let outcome = send(session, &request, out)?;
            after_registration(session, &name, &outcome, prompter, out)?;
        }
        _ => {
            let request = build_request(action, prompter)?;
            send(session, &request, out)?;
        }
    }
    Ok(Step::Continue)
}

/// Collect parameters for an API action and describe the call.
pub fn build_request(action: Action, p: &mut dyn Prompter) -> Result<ApiRequest> {
    let request = match action {
        Action::AgentMe => endpoints::me(),
        Action::AgentStatus => endpoints::status(),
        Action::AgentProfile => endpoints::profile(&ask_name(p, "Agent name")?),
        Action::PersonalFeed => {
            let sort = ask_choice(p, "Sort", &["hot", "new", "top"], "hot")?;
            let limit = p.integer("Limit", Some(25), 1, 50)?;
            endpoints::personal_feed(&sort, limit)
        }
        Action::GlobalFeed => {
            let sort = ask_choice(p, "Sort", &["hot", "new", "top", "rising"], "hot")?;
            let limit = p.integer("Limit", Some(25), 1, 50)?;
            let submolt = p
                .optional_text("Filter by submolt (blank for all)")?
                .map(|s| validate_name("Submolt name", &s))
                .transpose()?;
            endpoints::global_feed(&sort, limit, submolt.as_deref())
        }
        Action::SubmoltFeed => {
            let submolt = validate_name("Submolt name", &p.text("Submolt name", Some("general"))?)?;
            let sort = ask_choice(p, "Sort", &["new", "hot", "top", "rising"], "new")?;
            endpoints::submolt_feed(&submolt, &sort)
        }
        Action::GetPost => endpoints::get_post(&ask_id(p, "POST_ID")?),
        Action::CreatePost => {
            let submolt = validate_name("Submolt", &p.text("Submolt", Some("general"))?)?;
            let title = validate_text("Title", &p.text("Title", None)?, MAX_TITLE)?;
            let kind = if p.confirm("Link post?", false)? {
                PostKind::Link(validate_url(&p.text("URL (https://...)", None)?)?)
            } else {
                PostKind::Text(validate_text("Content", &p.text("Content", None)?, MAX_CONTENT)?)
            };
            endpoints::create_post(&submolt, &title, &kind)
        }
        Action::DeletePost => {
            let id = ask_id(p, "POST_ID")?;
            confirm_or_cancel(p, &format!("Delete post {id}?"))?;
            endpoints::delete_post(&id)
        }
        Action::ListComments => {
            let id = ask_id(p, "POST_ID")?;
            let sort = ask_choice(p, "Sort", &["top", "new", "controversial"], "top")?;
            endpoints::comments(&id, &sort)
        }
        Action::AddComment => {
            let id = ask_id(p, "POST_ID")?;
            let content = validate_text("Comment", &p.text("Comment content", None)?, MAX_COMMENT)?;
            let parent = p
                .optional_text("Parent COMMENT_ID (blank if top-level)")?
                .map(|s| validate_id("COMMENT_ID", &s))
                .transpose()?;
            endpoints::add_comment(&id, &content, parent.as_deref())
        }
        Action::UpvotePost => endpoints::upvote_post(&ask_id(p, "POST_ID")?),
        Action::DownvotePost => endpoints::downvote_post(&ask_id(p, "POST_ID")?),
        Action::UpvoteComment => endpoints::upvote_comment(&ask_id(p, "COMMENT_ID")?),
        Action::ListSubmolts => endpoints::list_submolts(),
        Action::GetSubmolt => endpoints::get_submolt(&ask_name(p, "Submolt name")?),
        Action::CreateSubmolt => {
            let name = ask_name(p, "Submolt name (short, url-safe)")?;
            let display = validate_text("Display name", &p.text("Display name", None)?, MAX_DISPLAY_NAME)?;
            let description =
                validate_text("Description", &p.text("Description", None)?, MAX_DESCRIPTION)?;
            endpoints::create_submolt(&name, &display, &description)
        }
        Action::Subscribe => endpoints::subscribe(&ask_name(p, "Submolt name")?),
        Action::Unsubscribe => endpoints::unsubscribe(&ask_name(p, "Submolt name")?),
        Action::Follow => endpoints::follow(&ask_name(p, "Agent name to follow")?),
        Action::Unfollow => endpoints::unfollow(&ask_name(p, "Agent name to unfollow")?),
        Action::Search => {
            let q = validate_text("Query", &p.text("Search query (natural language)", None)?, MAX_QUERY)?;
            let kind = ask_choice(p, "Type", &["all", "posts", "comments"], "all")?;
            let limit = p.integer("Limit", Some(20), 1, 50)?;
            endpoints::search(&q, &kind, limit)
        }
        Action::DmCheck => endpoints::dm_check(),
        Action::DmRequests => endpoints::dm_requests(),
        Action::DmApprove => endpoints::dm_approve(&ask_id(p, "CONVERSATION_ID")?),
        Action::DmConversations => endpoints::dm_conversations(),
        Action::DmRead => endpoints::dm_read(&ask_id(p, "CONVERSATION_ID")?),
        Action::DmSend => {
            let id = ask_id(p, "CONVERSATION_ID")?;
            let message = validate_text("Message", &p.text("Message", None)?, MAX_MESSAGE)?;
            endpoints::dm_send(&id, &message)
        }
        Action::DmRequest => {
            let to = ask_name(p, "Recipient agent name")?;
            let message = validate_text("Message", &p.text("Initial message", None)?, MAX_MESSAGE)?;
            endpoints::dm_request(&to, &message)
        }
        Action::Register => register_request(p)?.0,
        Action::UpdateProfile => {
            let description =
                validate_text("Description", &p.text("New description", None)?, MAX_DESCRIPTION)?;
            endpoints::update_profile(&description)
        }
        Action::UploadAvatar => {
            let file = validate_upload_file(&p.text("Image file path", None)?)?;
            endpoints::upload_avatar(&file)
        }
        Action::RemoveAvatar => {
            confirm_or_cancel(p, "Remove your avatar?")?;
            endpoints::remove_avatar()
        }
        Action::UploadBanner => {
            let name = ask_name(p, "Submolt name")?;
            let file = validate_upload_file(&p.text("Banner image path", None)?)?;
            endpoints::upload_banner(&name, &file)
        }
        Action::Exit
        | Action::SwitchKey
        | Action::SaveKey
        | Action::SetTimeout
        | Action::ToggleAuthDebug
        | Action::ShowSettings => {
            return Err(CliError::validation(format!(
                "{} does not send a request",
                action.label()
            )));
        }
    };
    Ok(request)
}

/// Send, with a spinner while waiting, and print the result.
fn send(session: &Session, request: &ApiRequest, out: &mut dyn Write) -> Result<Outcome> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("{} {}", request.method().as_str(), request.path()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let outcome = session
        .client
        .call(request, &session.credential, &session.config);
    spinner.finish_and_clear();

    let options = PresentOptions {
        auth_debug: (session.config.auth_debug && request.is_authenticated())
            .then(|| session.credential.masked()),
        color: session.color,
    };
    writeln!(out, "{}", output::present(&outcome, &options))?;
    Ok(outcome)
}

fn register_request(p: &mut dyn Prompter) -> Result<(ApiRequest, String)> {
    let name = ask_name(p, "New agent name")?;
    let description = validate_text("Description", &p.text("Description", None)?, MAX_DESCRIPTION)?;
    Ok((endpoints::register(&name, &description), name))
}

/// Offer to keep the key returned by a successful registration.
fn after_registration(
    session: &mut Session,
    name: &str,
    outcome: &Outcome,
    p: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    if !outcome.is_success() {
        return Ok(());
    }
    let Some(record) = registration_record(outcome.body(), name) else {
        return Ok(());
    };
    let Some(credential) = Credential::parse(&record.api_key) else {
        return Ok(());
    };

    let path = session.store.path().display().to_string();
    if p.confirm(&format!("Save the new agent's credentials to {path}?"), true)? {
        persist(session, &record, out)?;
    }
    if p.confirm("Switch this session to the new key?", true)? {
        session.credential = credential;
        let msg = format!("Now using key {}", session.credential.masked());
        writeln!(out, "{}", output::notice(true, &msg, session.color))?;
    }
    Ok(())
}

/// Pull key, claim URL and verification code out of a registration
/// response (`{"agent": {...}}` or flat).
pub fn registration_record(body: &Value, name: &str) -> Option<CredentialRecord> {
    let agent = body.get("agent").filter(|a| a.is_object()).unwrap_or(body);
    let field = |key: &str| {
        agent
            .get(key)
            .or_else(|| body.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let api_key = field("api_key")?;
    Some(CredentialRecord {
        api_key,
        agent_name: Some(name.to_string()),
        claim_url: field("claim_url"),
        verification_code: field("verification_code"),
    })
}

fn switch_key(session: &mut Session, p: &mut dyn Prompter, out: &mut dyn Write) -> Result<()> {
    let raw = p.secret("New Moltbook API key (input hidden)")?;
    let credential = Credential::parse(&raw)
        .ok_or_else(|| CliError::validation("Key was empty after sanitization; keeping the current key."))?;
    if !credential.has_expected_prefix() {
        let msg = format!("API key does not start with '{EXPECTED_KEY_PREFIX}'. Proceeding anyway.");
        writeln!(out, "{}", output::warning(&msg, session.color))?;
    }
    session.credential = credential;
    info!(key = %session.credential.masked(), "Switched API key");
    let msg = format!("Now using key {}", session.credential.masked());
    writeln!(out, "{}", output::notice(true, &msg, session.color))?;

    let path = session.store.path().display().to_string();
    if p.confirm(&format!("Save this key to {path}?"), false)? {
        let record = record_for_current_key(session);
        persist(session, &record, out)?;
    }
    Ok(())
}

/// Keep registration details already on disk when they belong to the
/// current key; otherwise start a fresh record.
fn record_for_current_key(session: &Session) -> CredentialRecord {
    match session.store.load() {
        Some(existing) if existing.api_key == session.credential.expose() => existing,
        _ => CredentialRecord::new(session.credential.expose()),
    }
}

/// Save, reporting failure without ending the session.
fn persist(session: &Session, record: &CredentialRecord, out: &mut dyn Write) -> Result<()> {
    match session.store.save(record) {
        Ok(()) => {
            let msg = format!("Saved credentials to {}", session.store.path().display());
            writeln!(out, "{}", output::notice(true, &msg, session.color))?;
        }
        Err(e) => {
            warn!(error = %e, "Could not save credentials");
            let msg = format!("{e}; the key is kept for this session only.");
            writeln!(out, "{}", output::warning(&msg, session.color))?;
        }
    }
    Ok(())
}

fn show_settings(session: &Session, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Base URL:          {}", session.client.base_url())?;
    writeln!(out, "API key:           {}", session.credential.masked())?;
    writeln!(out, "Request timeout:   {}s", session.config.timeout.as_secs())?;
    writeln!(
        out,
        "Auth debug:        {}",
        if session.config.auth_debug { "on" } else { "off" }
    )?;
    writeln!(out, "Credentials file:  {}", session.store.path().display())?;
    Ok(())
}

fn ask_name(p: &mut dyn Prompter, label: &str) -> Result<String> {
    validate_name(label, &p.text(label, None)?)
}

fn ask_id(p: &mut dyn Prompter, label: &str) -> Result<String> {
    validate_id(label, &p.text(label, None)?)
}

fn ask_choice(p: &mut dyn Prompter, label: &str, allowed: &[&str], default: &str) -> Result<String> {
    let prompt = format!("{label} ({})", allowed.join("/"));
    let value = p.text(&prompt, Some(default))?.to_ascii_lowercase();
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(CliError::validation(format!(
            "{label} must be one of: {}",
            allowed.join(", ")
        )))
    }
}

fn confirm_or_cancel(p: &mut dyn Prompter, question: &str) -> Result<()> {
    if p.confirm(question, false)? {
        Ok(())
    } else {
        Err(CliError::validation("Cancelled; nothing was sent."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::transport::{PreparedRequest, RawResponse, Transport, TransportError};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const TOKEN: &str = "moltbook_abcdef1234";

    #[derive(Debug, Clone, PartialEq)]
    struct Seen {
        method: &'static str,
        url: String,
        bearer: bool,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        seen: Rc<RefCell<Vec<Seen>>>,
        replies: Rc<RefCell<VecDeque<RawResponse>>>,
    }

    impl Transport for Recorder {
        fn send(
            &self,
            request: &PreparedRequest<'_>,
            _timeout: Duration,
        ) -> std::result::Result<RawResponse, TransportError> {
            self.seen.borrow_mut().push(Seen {
                method: request.method.as_str(),
                url: request.url.to_string(),
                bearer: request.bearer.is_some(),
            });
            Ok(self
                .replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| RawResponse::new(200, r#"{"success":true}"#)))
        }
    }

    fn session(recorder: &Recorder, dir: &tempfile::TempDir) -> Session {
        Session {
            client: ApiClient::builder()
                .transport(Box::new(recorder.clone()))
                .build()
                .unwrap(),
            credential: Credential::parse(TOKEN).unwrap(),
            config: SessionConfig::default(),
            store: CredentialStore::new(dir.path().join("credentials.json")),
            color: false,
        }
    }

    fn run_action(action: Action, session: &mut Session, answers: &[&str]) -> (Result<Step>, String) {
        let mut prompter = ScriptedPrompter::new(answers.iter().copied());
        let mut out = Vec::new();
        let result = dispatch(action, session, &mut prompter, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_get_post_builds_url() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, text) = run_action(Action::GetPost, &mut s, &["abc123"]);
        assert_eq!(result.unwrap(), Step::Continue);
        assert!(text.starts_with("OK: HTTP 200"));
        let seen = recorder.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].url, "https://www.moltbook.com/api/v1/posts/abc123");
        assert!(seen[0].bearer);
    }

    #[test]
    fn test_validation_failure_sends_nothing() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, _) = run_action(Action::GetPost, &mut s, &["a/b"]);
        assert!(matches!(result, Err(CliError::Validation(_))));

        let (result, _) = run_action(Action::PersonalFeed, &mut s, &["sideways"]);
        assert!(matches!(result, Err(CliError::Validation(_))));
        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, _) = run_action(Action::DeletePost, &mut s, &["p1", "n"]);
        assert!(result.unwrap_err().is_recoverable());
        assert!(recorder.seen.borrow().is_empty());

        let (result, _) = run_action(Action::DeletePost, &mut s, &["p1", "y"]);
        assert!(result.is_ok());
        assert_eq!(recorder.seen.borrow()[0].method, "DELETE");
    }

    #[test]
    fn test_create_link_post_with_defaults() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, _) = run_action(
            Action::CreatePost,
            &mut s,
            &["", "Look at this", "y", "https://example.com/a"],
        );
        assert!(result.is_ok());
        let seen = recorder.seen.borrow();
        assert_eq!(seen[0].method, "POST");
        assert!(seen[0].url.ends_with("/api/v1/posts"));
    }

    #[test]
    fn test_auth_debug_output_is_masked() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (_, text) = run_action(Action::ToggleAuthDebug, &mut s, &[]);
        assert!(text.contains("Auth debug enabled"));
        let (_, text) = run_action(Action::AgentMe, &mut s, &[]);
        assert!(text.contains("[auth-debug] Authorization: Bearer moltbook…1234"));
        assert!(!text.contains(TOKEN));
        let (_, text) = run_action(Action::ShowSettings, &mut s, &[]);
        assert!(!text.contains(TOKEN));
    }

    #[test]
    fn test_set_timeout() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, text) = run_action(Action::SetTimeout, &mut s, &["7"]);
        assert!(result.is_ok());
        assert!(text.contains("7s"));
        assert_eq!(s.config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_switch_key_and_save() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, text) = run_action(Action::SwitchKey, &mut s, &[" \"moltbook_newkey99\" ", "y"]);
        assert!(result.is_ok());
        assert_eq!(s.credential.expose(), "moltbook_newkey99");
        assert!(!text.contains("moltbook_newkey99"));
        assert_eq!(s.store.load().unwrap().api_key, "moltbook_newkey99");
    }

    #[test]
    fn test_switch_key_rejects_blank() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, _) = run_action(Action::SwitchKey, &mut s, &["  "]);
        assert!(matches!(result, Err(CliError::Validation(_))));
        assert_eq!(s.credential.expose(), TOKEN);
    }

    #[test]
    fn test_register_saves_and_switches() {
        let recorder = Recorder::default();
        recorder.replies.borrow_mut().push_back(RawResponse::new(
            201,
            r#"{"agent":{"api_key":"moltbook_fresh0001","claim_url":"https://www.moltbook.com/claim/x","verification_code":"reef-42"}}"#,
        ));
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let (result, _) = run_action(Action::Register, &mut s, &["crabby", "test agent", "y", "y"]);
        assert!(result.is_ok());
        assert!(!recorder.seen.borrow()[0].bearer);

        let saved = s.store.load().unwrap();
        assert_eq!(saved.api_key, "moltbook_fresh0001");
        assert_eq!(saved.agent_name.as_deref(), Some("crabby"));
        assert_eq!(saved.claim_url.as_deref(), Some("https://www.moltbook.com/claim/x"));
        assert_eq!(saved.verification_code.as_deref(), Some("reef-42"));
        assert_eq!(s.credential.expose(), "moltbook_fresh0001");
    }

    #[test]
    fn test_failed_save_is_not_fatal() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let mut s = session(&recorder, &dir);
        s.store = CredentialStore::new(blocker.join("credentials.json"));
        let (result, text) = run_action(Action::SaveKey, &mut s, &[]);
        assert!(result.is_ok());
        assert!(text.contains("kept for this session only"));
    }

    #[test]
    fn test_local_actions_are_not_requests() {
        let mut p = ScriptedPrompter::new(Vec::<String>::new());
        assert!(build_request(Action::SetTimeout, &mut p).is_err());
    }

    #[test]
    fn test_run_loop_exits() {
        let recorder = Recorder::default();
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&recorder, &dir);
        let mut prompter = ScriptedPrompter::new(["1", "0"]);
        let mut out = Vec::new();
        run(&mut s, &mut prompter, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Main Menu"));
        assert!(text.ends_with("Exiting.\n"));
        assert_eq!(recorder.seen.borrow().len(), 1);
    }

    #[test]
    fn test_registration_record_flat_body() {
        let body = serde_json::json!({"api_key": "moltbook_k", "claim_url": "u"});
        let record = registration_record(&body, "n").unwrap();
        assert_eq!(record.api_key, "moltbook_k");
        assert_eq!(record.claim_url.as_deref(), Some("u"));
        assert!(registration_record(&serde_json::json!({"success": true}), "n").is_none());
    }
}
