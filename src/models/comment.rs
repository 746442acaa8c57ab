use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl CommentAuthor {
    pub fn shown_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub raw_content: String,
    pub author: CommentAuthor,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentEdge {
    pub comment: Comment,
    pub cursor: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentConnection {
    pub data: Vec<CommentEdge>,
    pub has_next_page: bool,
}

/// Body of `GET /api/v1/projects/{id}/comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentPage {
    pub comments: CommentConnection,
}

#[derive(Debug, Serialize)]
pub struct PostCommentRequest<'a> {
    pub content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostCommentResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Push event delivered by the hosting platform when a comment is created.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentCreatedEvent {
    pub comment: Comment,
}
