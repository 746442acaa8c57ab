use chrono::{DateTime, Utc};

use crate::models::{Record, RecordPayload, chat::ChatRole, comment::Comment};

pub const FILLED_STAR: char = '★';
pub const EMPTY_STAR: char = '☆';

/// Escapes user-supplied text for use inside element content.
pub fn sanitize(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Accepts absolute http(s) URLs and site-relative paths only, encoded for a
/// double-quoted attribute.
pub fn safe_url(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let allowed = lower.starts_with("https://")
        || lower.starts_with("http://")
        || (url.starts_with('/') && !url.starts_with("//"));
    if !allowed {
        return None;
    }
    Some(html_escape::encode_double_quoted_attribute(url).into_owned())
}

/// `rating` filled stars followed by `5 - rating` empty ones. Out-of-range input is clamped.
pub fn star_glyph(rating: i64) -> String {
    let filled = rating.clamp(0, 5) as usize;
    let mut glyph = String::with_capacity(5 * FILLED_STAR.len_utf8());
    glyph.extend(std::iter::repeat_n(FILLED_STAR, filled));
    glyph.extend(std::iter::repeat_n(EMPTY_STAR, 5 - filled));
    glyph
}

pub fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

pub fn display_datetime(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Maps one record to a markup fragment.
pub trait Renderer: Send + Sync + 'static {
    /// `None` when the record is not of this renderer's kind.
    fn render(&self, record: &Record) -> Option<String>;

    /// Placeholder shown instead of an empty container.
    fn empty_state(&self) -> Option<&'static str>;
}

pub struct ReviewRenderer;

impl Renderer for ReviewRenderer {
    fn render(&self, record: &Record) -> Option<String> {
        let RecordPayload::Review(review) = &record.payload else {
            return None;
        };
        Some(format!(
            "<div class=\"review-item\">\
             <div class=\"rating\">{stars}</div>\
             <blockquote>\"{text}\"</blockquote>\
             <div class=\"review-footer\">Reviewed by <strong>{user}</strong> on {date}<br>\
             Re: <strong>{subject}</strong></div>\
             </div>",
            stars = star_glyph(i64::from(review.rating)),
            text = sanitize(&review.review_text),
            user = sanitize(&record.username),
            date = display_date(&record.created_at),
            subject = sanitize(&review.subject_name),
        ))
    }

    fn empty_state(&self) -> Option<&'static str> {
        Some("No reviews yet. Be the first!")
    }
}

pub struct IncidentRenderer;

impl Renderer for IncidentRenderer {
    fn render(&self, record: &Record) -> Option<String> {
        let RecordPayload::Incident(incident) = &record.payload else {
            return None;
        };
        let image = incident
            .image_url
            .as_deref()
            .and_then(safe_url)
            .map(|src| {
                format!(
                    "<img src=\"{src}\" alt=\"Incident image\" class=\"incident-image\">"
                )
            })
            .unwrap_or_default();
        Some(format!(
            "<div class=\"review-item\">\
             <blockquote>\"{text}\"</blockquote>{image}\
             <div class=\"review-footer\">Reported by <strong>{user}</strong> on {date}</div>\
             </div>",
            text = sanitize(&incident.description),
            user = sanitize(&record.username),
            date = display_date(&record.created_at),
        ))
    }

    fn empty_state(&self) -> Option<&'static str> {
        Some("No incidents reported yet.")
    }
}

pub struct ContractorRenderer;

impl Renderer for ContractorRenderer {
    fn render(&self, record: &Record) -> Option<String> {
        let RecordPayload::Contractor(c) = &record.payload else {
            return None;
        };
        Some(format!(
            "<div class=\"review-item\">\
             <strong>{name}</strong><br>\
             License: {license}<br>\
             Workman's Comp: {comp}<br>\
             Liability Ins: {liability}<br>\
             Registered on {date}\
             </div>",
            name = sanitize(&c.name),
            license = sanitize(&c.license),
            comp = sanitize(&c.workman_comp),
            liability = sanitize(&c.liability),
            date = display_date(&record.created_at),
        ))
    }

    fn empty_state(&self) -> Option<&'static str> {
        Some("No contractors registered yet.")
    }
}

pub struct PermitRenderer;

impl Renderer for PermitRenderer {
    fn render(&self, record: &Record) -> Option<String> {
        let RecordPayload::Permit(p) = &record.payload else {
            return None;
        };
        let link = safe_url(&p.file_url)
            .map(|href| {
                format!(" <a href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">View</a>")
            })
            .unwrap_or_default();
        Some(format!(
            "<div class=\"review-item\"><strong>{name}</strong> uploaded on {at}{link}</div>",
            name = sanitize(&p.file_name),
            at = display_datetime(&p.uploaded_at),
        ))
    }

    fn empty_state(&self) -> Option<&'static str> {
        Some("No permits uploaded yet.")
    }
}

/// Thumbnails for records carrying an image.
pub struct GalleryRenderer;

impl Renderer for GalleryRenderer {
    fn render(&self, record: &Record) -> Option<String> {
        let src = record.image_url().and_then(safe_url)?;
        Some(format!(
            "<img src=\"{src}\" class=\"gallery-thumb\" alt=\"Address image thumbnail\">"
        ))
    }

    fn empty_state(&self) -> Option<&'static str> {
        None
    }
}

pub fn render_comment(comment: &Comment) -> String {
    let body = comment
        .raw_content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", sanitize(p).replace('\n', "<br>")))
        .collect::<String>();
    format!(
        "<div class=\"comment-item\" id=\"comment-{id}\">\
         <div class=\"comment-header\">\
         <span class=\"comment-author\">{author}</span>\
         <span class=\"comment-date\">{date}</span>\
         </div>\
         <div class=\"comment-body\">{body}</div>\
         </div>",
        id = html_escape::encode_double_quoted_attribute(&comment.id),
        author = sanitize(comment.author.shown_name()),
        date = display_datetime(&comment.created_at),
    )
}

pub fn render_chat_turn(role: ChatRole, text: &str) -> String {
    let sender = match role {
        ChatRole::User => "user",
        ChatRole::Assistant | ChatRole::System => "bot",
    };
    format!(
        "<div class=\"chat-message {sender}-message\" role=\"status\"><p>{}</p></div>",
        sanitize(text)
    )
}
