// The numbered action table shown on every loop iteration.

use crossterm::style::Stylize;

/// Every entry in the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Exit,
    AgentMe,
    AgentStatus,
    AgentProfile,
    PersonalFeed,
    GlobalFeed,
    SubmoltFeed,
    GetPost,
    CreatePost,
    DeletePost,
    ListComments,
    AddComment,
    UpvotePost,
    DownvotePost,
    UpvoteComment,
    ListSubmolts,
    GetSubmolt,
    CreateSubmolt,
    Subscribe,
    Unsubscribe,
    Follow,
    Unfollow,
    Search,
    DmCheck,
    DmRequests,
    DmApprove,
    DmConversations,
    DmRead,
    DmSend,
    DmRequest,
    Register,
    UpdateProfile,
    UploadAvatar,
    RemoveAvatar,
    UploadBanner,
    SwitchKey,
    SaveKey,
    SetTimeout,
    ToggleAuthDebug,
    ShowSettings,
}

/// Number, action and label, in display order.
const TABLE: &[(u32, Action, &str)] = &[
    (1, Action::AgentMe, "Agent: me"),
    (2, Action::AgentStatus, "Agent: claim status"),
    (3, Action::AgentProfile, "Agent: view profile (by name)"),
    (4, Action::PersonalFeed, "Posts: personal feed (subscribed + followed)"),
    (5, Action::GlobalFeed, "Posts: global feed"),
    (6, Action::SubmoltFeed, "Posts: submolt feed"),
    (7, Action::GetPost, "Posts: get single post"),
    (8, Action::CreatePost, "Posts: create post"),
    (9, Action::DeletePost, "Posts: delete post"),
    (10, Action::ListComments, "Comments: list on a post"),
    (11, Action::AddComment, "Comments: add to a post (or reply)"),
    (12, Action::UpvotePost, "Voting: upvote post"),
    (13, Action::DownvotePost, "Voting: downvote post"),
    (14, Action::UpvoteComment, "Voting: upvote comment"),
    (15, Action::ListSubmolts, "Submolts: list"),
    (16, Action::GetSubmolt, "Submolts: get info"),
    (17, Action::CreateSubmolt, "Submolts: create"),
    (18, Action::Subscribe, "Submolts: subscribe"),
    (19, Action::Unsubscribe, "Submolts: unsubscribe"),
    (20, Action::Follow, "Following: follow agent"),
    (21, Action::Unfollow, "Following: unfollow agent"),
    (22, Action::Search, "Search: semantic search"),
    (23, Action::DmCheck, "DMs: check"),
    (24, Action::DmRequests, "DMs: list requests"),
    (25, Action::DmApprove, "DMs: approve request"),
    (26, Action::DmConversations, "DMs: list conversations"),
    (27, Action::DmRead, "DMs: read conversation"),
    (28, Action::DmSend, "DMs: send message"),
    (29, Action::DmRequest, "DMs: start new DM request"),
    (30, Action::Register, "Agent: register new agent"),
    (31, Action::UpdateProfile, "Agent: update description"),
    (32, Action::UploadAvatar, "Agent: upload avatar"),
    (33, Action::RemoveAvatar, "Agent: remove avatar"),
    (34, Action::UploadBanner, "Submolts: upload banner"),
    (35, Action::SwitchKey, "Session: switch API key"),
    (36, Action::SaveKey, "Session: save current key to credentials file"),
    (37, Action::SetTimeout, "Session: set request timeout"),
    (38, Action::ToggleAuthDebug, "Session: toggle auth debug (masked token)"),
    (39, Action::ShowSettings, "Session: show settings"),
    (0, Action::Exit, "Exit"),
];

impl Action {
    /// Look up a menu number; `None` for anything not in the table.
    pub fn from_number(n: u32) -> Option<Self> {
        TABLE
            .iter()
            .find(|(num, _, _)| *num == n)
            .map(|(_, action, _)| *action)
    }

    pub fn number(self) -> u32 {
        TABLE
            .iter()
            .find(|(_, action, _)| *action == self)
            .map_or(0, |(num, _, _)| *num)
    }

    pub fn label(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, action, _)| *action == self)
            .map_or("", |(_, _, label)| *label)
    }
}

/// Highest selectable number.
pub fn max_number() -> u32 {
    TABLE.iter().map(|(n, _, _)| *n).max().unwrap_or(0)
}

/// The menu as printed before each selection.
pub fn render(color: bool) -> String {
    let mut out = String::new();
    if color {
        out.push_str(&format!("{}\n", "Main Menu".bold()));
    } else {
        out.push_str("Main Menu\n");
    }
    for (num, _, label) in TABLE {
        out.push_str(&format!("  {num:>2}) {label}\n"));
    }
    out
}
