use crate::{
    comments::CommentSource,
    errors::AppError,
    live::render::render_comment,
    models::{
        comment::{Comment, CommentPage},
        dashboard::Placement,
    },
};

pub const COMMENTS_UNAVAILABLE: &str = "<p>Could not load community forum.</p>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentsUpdate {
    pub html: String,
    pub placement: Placement,
    /// `None` when the update does not change pagination.
    pub has_more: Option<bool>,
}

/// Cursor-paginated comment list. Pages are appended; pushed comments are prepended.
#[derive(Debug, Default)]
pub struct CommentsFeed {
    cursor: Option<String>,
    loaded: bool,
}

impl CommentsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        !self.loaded || self.cursor.is_some()
    }

    /// Fetches the page after the current cursor (the first page when nothing
    /// was loaded yet). `Ok(None)` when every page was already loaded.
    pub async fn load_next(
        &mut self,
        source: &dyn CommentSource,
    ) -> Result<Option<CommentsUpdate>, AppError> {
        if !self.has_more() {
            return Ok(None);
        }
        let page = source.fetch_page(self.cursor.as_deref()).await?;
        Ok(Some(self.page_loaded(page)))
    }

    pub fn page_loaded(&mut self, page: CommentPage) -> CommentsUpdate {
        let connection = page.comments;
        let html = connection
            .data
            .iter()
            .map(|edge| render_comment(&edge.comment))
            .collect::<String>();

        self.loaded = true;
        self.cursor = if connection.has_next_page {
            connection.data.last().map(|edge| edge.cursor.clone())
        } else {
            None
        };

        CommentsUpdate {
            html,
            placement: Placement::Append,
            has_more: Some(self.cursor.is_some()),
        }
    }

    /// A `comment:created` push. Replies are not shown at the top level.
    pub fn created(&self, comment: &Comment) -> Option<CommentsUpdate> {
        if comment.parent_comment_id.is_some() {
            return None;
        }
        Some(CommentsUpdate {
            html: render_comment(comment),
            placement: Placement::Prepend,
            has_more: None,
        })
    }
}
