use crate::{
    live::render::Renderer,
    models::Record,
};

pub const SECTION_UNAVAILABLE: &str = "<p>Could not load this section.</p>";

/// Keeps one container's markup consistent with the latest snapshot of a
/// collection. Every snapshot fully replaces the container.
pub struct LiveBinding<R: Renderer> {
    section: &'static str,
    renderer: R,
    limit: Option<usize>,
    html: String,
}

impl<R: Renderer> LiveBinding<R> {
    pub fn new(section: &'static str, renderer: R) -> Self {
        Self {
            section,
            renderer,
            limit: None,
            html: String::new(),
        }
    }

    /// Renders at most `limit` records (the newest ones).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn section(&self) -> &'static str {
        self.section
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Redraws from `snapshot` (creation order) and returns the new markup.
    pub fn apply(&mut self, snapshot: &[Record]) -> &str {
        let fragments = snapshot
            .iter()
            .rev()
            .filter_map(|record| self.renderer.render(record))
            .take(self.limit.unwrap_or(usize::MAX));

        let mut html = String::new();
        for fragment in fragments {
            html.push_str(&fragment);
        }

        if html.is_empty() {
            if let Some(placeholder) = self.renderer.empty_state() {
                html = format!("<p>{placeholder}</p>");
            }
        }

        self.html = html;
        &self.html
    }

    /// Marks the container as failed, leaving other sections untouched.
    pub fn fail(&mut self) -> &str {
        self.html = SECTION_UNAVAILABLE.to_string();
        &self.html
    }
}
