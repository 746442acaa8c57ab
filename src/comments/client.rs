use async_trait::async_trait;
use reqwest::Url;

use crate::{
    errors::AppError,
    models::comment::{CommentPage, PostCommentRequest, PostCommentResponse},
};

/// Hosting platform comment service.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// `after` is the opaque cursor of the last comment already shown.
    async fn fetch_page(&self, after: Option<&str>) -> Result<CommentPage, AppError>;

    /// Success only means the post was accepted; the comment itself arrives
    /// later as a `comment:created` push.
    async fn post_comment(&self, content: &str) -> Result<(), AppError>;
}

pub struct HostingClient {
    http: reqwest::Client,
    base: Url,
    project_id: String,
    api_key: Option<String>,
}

impl HostingClient {
    pub fn new(
        http: reqwest::Client,
        base: &str,
        project_id: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, AppError> {
        let base = Url::parse(base)
            .map_err(|e| AppError::EnvError(format!("HOSTING_API_BASE is invalid: {e}")))?;
        Ok(Self {
            http,
            base,
            project_id: project_id.into(),
            api_key,
        })
    }

    fn comments_url(&self) -> Result<Url, AppError> {
        self.base
            .join(&format!("/api/v1/projects/{}/comments", self.project_id))
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }

    /// `.../comments` for the first page, `.../comments?after={cursor}` afterwards.
    pub fn page_url(&self, after: Option<&str>) -> Result<Url, AppError> {
        let mut url = self.comments_url()?;
        if let Some(cursor) = after {
            url.query_pairs_mut().append_pair("after", cursor);
        }
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl CommentSource for HostingClient {
    async fn fetch_page(&self, after: Option<&str>) -> Result<CommentPage, AppError> {
        let url = self.page_url(after)?;
        let res = self.authorized(self.http.get(url)).send().await?;

        if !res.status().is_success() {
            tracing::error!("Comment page request returned {}", res.status());
            return Err(AppError::Upstream(format!(
                "comments request failed with {}",
                res.status()
            )));
        }

        res.json::<CommentPage>().await.map_err(|e| {
            tracing::error!("Invalid comments response: {}", e);
            AppError::Deserialization(e.to_string())
        })
    }

    async fn post_comment(&self, content: &str) -> Result<(), AppError> {
        let url = self.comments_url()?;
        let res = self
            .authorized(self.http.post(url))
            .json(&PostCommentRequest { content })
            .send()
            .await?;

        let status = res.status();
        let body: PostCommentResponse = res.json().await.unwrap_or_default();
        match body.error {
            Some(error) => Err(AppError::BadRequest(error)),
            None if !status.is_success() => Err(AppError::Upstream(format!(
                "comment post failed with {status}"
            ))),
            None => Ok(()),
        }
    }
}

/// Stand-in used when the hosting platform is not configured.
pub struct OfflineComments;

#[async_trait]
impl CommentSource for OfflineComments {
    async fn fetch_page(&self, _after: Option<&str>) -> Result<CommentPage, AppError> {
        Err(AppError::Unavailable("Not connected.".into()))
    }

    async fn post_comment(&self, _content: &str) -> Result<(), AppError> {
        Err(AppError::Unavailable("Not connected.".into()))
    }
}
