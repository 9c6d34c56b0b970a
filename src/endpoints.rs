// Request constructors for every Moltbook API operation the menu exposes.
// Each function only describes the call; sending happens in
// `ApiClient::call`.

use serde_json::{json, Map, Value};
use std::path::Path;

use crate::api::ApiRequest;

// -------- Agents --------

pub fn me() -> ApiRequest {
    ApiRequest::get("/agents/me")
}

/// Claim status of the current agent.
pub fn status() -> ApiRequest {
    ApiRequest::get("/agents/status")
}

pub fn profile(name: &str) -> ApiRequest {
    ApiRequest::get("/agents/profile").query("name", name)
}

/// Create a new agent. Sent without a bearer token; the response carries
/// the new `api_key`, `claim_url` and `verification_code`.
pub fn register(name: &str, description: &str) -> ApiRequest {
    ApiRequest::post("/agents/register")
        .json(json!({ "name": name, "description": description }))
        .unauthenticated()
}

pub fn update_profile(description: &str) -> ApiRequest {
    ApiRequest::patch("/agents/me").json(json!({ "description": description }))
}

pub fn upload_avatar(file: &Path) -> ApiRequest {
    ApiRequest::post("/agents/me/avatar").multipart("file", file, Vec::new())
}

pub fn remove_avatar() -> ApiRequest {
    ApiRequest::delete("/agents/me/avatar")
}

pub fn follow(agent: &str) -> ApiRequest {
    ApiRequest::post("/agents/{}/follow").param(agent)
}

pub fn unfollow(agent: &str) -> ApiRequest {
    ApiRequest::delete("/agents/{}/follow").param(agent)
}

// -------- Posts --------

/// Posts from subscribed submolts and followed agents.
pub fn personal_feed(sort: &str, limit: u64) -> ApiRequest {
    ApiRequest::get("/feed").query("sort", sort).query("limit", limit)
}

pub fn global_feed(sort: &str, limit: u64, submolt: Option<&str>) -> ApiRequest {
    let req = ApiRequest::get("/posts")
        .query("sort", sort)
        .query("limit", limit);
    match submolt {
        Some(s) => req.query("submolt", s),
        None => req,
    }
}

pub fn submolt_feed(submolt: &str, sort: &str) -> ApiRequest {
    ApiRequest::get("/submolts/{}/feed")
        .param(submolt)
        .query("sort", sort)
}

pub fn get_post(post_id: &str) -> ApiRequest {
    ApiRequest::get("/posts/{}").param(post_id)
}

/// What a new post carries besides its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKind {
    Text(String),
    Link(String),
}

pub fn create_post(submolt: &str, title: &str, kind: &PostKind) -> ApiRequest {
    let mut body = Map::new();
    body.insert("submolt".into(), json!(submolt));
    body.insert("title".into(), json!(title));
    match kind {
        PostKind::Text(content) => body.insert("content".into(), json!(content)),
        PostKind::Link(url) => body.insert("url".into(), json!(url)),
    };
    ApiRequest::post("/posts").json(Value::Object(body))
}

pub fn delete_post(post_id: &str) -> ApiRequest {
    ApiRequest::delete("/posts/{}").param(post_id)
}

// -------- Comments --------

pub fn comments(post_id: &str, sort: &str) -> ApiRequest {
    ApiRequest::get("/posts/{}/comments")
        .param(post_id)
        .query("sort", sort)
}

/// Top-level comment, or a reply when `parent_id` is set.
pub fn add_comment(post_id: &str, content: &str, parent_id: Option<&str>) -> ApiRequest {
    let mut body = json!({ "content": content });
    if let Some(parent) = parent_id {
        body["parent_id"] = json!(parent);
    }
    ApiRequest::post("/posts/{}/comments").param(post_id).json(body)
}

// -------- Voting --------

pub fn upvote_post(post_id: &str) -> ApiRequest {
    ApiRequest::post("/posts/{}/upvote").param(post_id)
}

pub fn downvote_post(post_id: &str) -> ApiRequest {
    ApiRequest::post("/posts/{}/downvote").param(post_id)
}

pub fn upvote_comment(comment_id: &str) -> ApiRequest {
    ApiRequest::post("/comments/{}/upvote").param(comment_id)
}

// -------- Submolts --------

pub fn list_submolts() -> ApiRequest {
    ApiRequest::get("/submolts")
}

pub fn get_submolt(name: &str) -> ApiRequest {
    ApiRequest::get("/submolts/{}").param(name)
}

pub fn create_submolt(name: &str, display_name: &str, description: &str) -> ApiRequest {
    ApiRequest::post("/submolts").json(json!({
        "name": name,
        "display_name": display_name,
        "description": description,
    }))
}

pub fn subscribe(name: &str) -> ApiRequest {
    ApiRequest::post("/submolts/{}/subscribe").param(name)
}

pub fn unsubscribe(name: &str) -> ApiRequest {
    ApiRequest::delete("/submolts/{}/subscribe").param(name)
}

/// Banner image for a submolt you moderate.
pub fn upload_banner(name: &str, file: &Path) -> ApiRequest {
    ApiRequest::post("/submolts/{}/settings").param(name).multipart(
        "file",
        file,
        vec![("type".to_string(), "banner".to_string())],
    )
}

// -------- Search --------

pub fn search(q: &str, search_type: &str, limit: u64) -> ApiRequest {
    ApiRequest::get("/search")
        .query("q", q)
        .query("type", search_type)
        .query("limit", limit)
}

// -------- DMs --------

pub fn dm_check() -> ApiRequest {
    ApiRequest::get("/agents/dm/check")
}

pub fn dm_requests() -> ApiRequest {
    ApiRequest::get("/agents/dm/requests")
}

pub fn dm_approve(conversation_id: &str) -> ApiRequest {
    ApiRequest::post("/agents/dm/requests/{}/approve").param(conversation_id)
}

pub fn dm_conversations() -> ApiRequest {
    ApiRequest::get("/agents/dm/conversations")
}

pub fn dm_read(conversation_id: &str) -> ApiRequest {
    ApiRequest::get("/agents/dm/conversations/{}").param(conversation_id)
}

pub fn dm_send(conversation_id: &str, message: &str) -> ApiRequest {
    ApiRequest::post("/agents/dm/conversations/{}/send")
        .param(conversation_id)
        .json(json!({ "message": message }))
}

pub fn dm_request(to: &str, message: &str) -> ApiRequest {
    ApiRequest::post("/agents/dm/request").json(json!({ "to": to, "message": message }))
}
