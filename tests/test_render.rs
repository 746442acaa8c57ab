mod common;

use common::{comment, incident, incident_with_image, permit, records, review};

use recovery_hub::{
    live::render::{
        ContractorRenderer, IncidentRenderer, PermitRenderer, Renderer, ReviewRenderer,
        render_chat_turn, render_comment, safe_url, sanitize, star_glyph,
    },
    models::{chat::ChatRole, record::ReviewKind},
};

#[test]
fn test_star_glyph_is_clamped() {
    assert_eq!(star_glyph(4), "★★★★☆");
    assert_eq!(star_glyph(0), "☆☆☆☆☆");
    assert_eq!(star_glyph(9), "★★★★★");
    assert_eq!(star_glyph(-3), "☆☆☆☆☆");
}

#[test]
fn test_sanitize_escapes_markup() {
    assert_eq!(
        sanitize("<script>alert(1)</script> & co"),
        "&lt;script&gt;alert(1)&lt;/script&gt; &amp; co"
    );
}

#[test]
fn test_safe_url_rejects_scripts() {
    assert_eq!(
        safe_url("https://cdn.test/a.png").as_deref(),
        Some("https://cdn.test/a.png")
    );
    assert_eq!(safe_url("/uploads/a.png").as_deref(), Some("/uploads/a.png"));
    assert!(safe_url("javascript:alert(1)").is_none());
    assert!(safe_url("//evil.test/a.png").is_none());
    assert!(safe_url("data:text/html,hi").is_none());
}

#[test]
fn test_review_markup() {
    let record = &records(vec![review(
        ReviewKind::Contractor,
        "Acme Roofing",
        4,
        "Great <b>work</b>",
    )])[0];

    let html = ReviewRenderer.render(record).unwrap();

    assert!(html.contains("★★★★☆"));
    assert!(html.contains("Great &lt;b&gt;work&lt;/b&gt;"));
    assert!(html.contains("Reviewed by <strong>user0</strong> on 1/10/2025"));
    assert!(html.contains("Re: <strong>Acme Roofing</strong>"));
}

#[test]
fn test_incident_markup_drops_unsafe_image() {
    let safe = &records(vec![incident_with_image("Smoke", "https://img.test/a.jpg")])[0];
    let unsafe_image = &records(vec![incident_with_image("Smoke", "javascript:alert(1)")])[0];

    assert!(IncidentRenderer
        .render(safe)
        .unwrap()
        .contains("<img src=\"https://img.test/a.jpg\""));
    assert!(!IncidentRenderer.render(unsafe_image).unwrap().contains("<img"));
}

#[test]
fn test_renderers_ignore_other_kinds() {
    let record = &records(vec![incident("Smoke", 34.0, -118.5)])[0];

    assert!(ReviewRenderer.render(record).is_none());
    assert!(ContractorRenderer.render(record).is_none());
    assert!(PermitRenderer.render(record).is_none());
}

#[test]
fn test_permit_markup_links_file() {
    let record = &records(vec![permit("plans.pdf", "/uploads/abc-plans.pdf")])[0];

    let html = PermitRenderer.render(record).unwrap();

    assert!(html.contains("<strong>plans.pdf</strong> uploaded on 1/20/2025, 3:30:00 PM"));
    assert!(html.contains("href=\"/uploads/abc-plans.pdf\""));
}

#[test]
fn test_comment_markup() {
    let html = render_comment(&comment("c1", "Hello <all>\n\nSecond", None));

    assert!(html.contains("id=\"comment-c1\""));
    assert!(html.contains("c1-author"));
    assert!(html.contains("<p>Hello &lt;all&gt;</p><p>Second</p>"));
}

#[test]
fn test_chat_turn_markup() {
    assert_eq!(
        render_chat_turn(ChatRole::Assistant, "Hi <there>"),
        "<div class=\"chat-message bot-message\" role=\"status\"><p>Hi &lt;there&gt;</p></div>"
    );
    assert!(render_chat_turn(ChatRole::User, "x").contains("user-message"));
}
