mod common;

use common::{incident, incident_with_image, permit, records, review};

use recovery_hub::{
    live::{
        FirstSnapshot, LiveBinding, SeenSet,
        binding::SECTION_UNAVAILABLE,
        render::{GalleryRenderer, IncidentRenderer, PermitRenderer, ReviewRenderer},
    },
    models::record::ReviewKind,
};

#[test]
fn test_empty_snapshot_shows_placeholder() {
    let mut binding = LiveBinding::new("contractor-reviews-list", ReviewRenderer);

    assert_eq!(binding.apply(&[]), "<p>No reviews yet. Be the first!</p>");
}

#[test]
fn test_gallery_has_no_placeholder() {
    let mut binding = LiveBinding::new("address-gallery", GalleryRenderer);

    assert_eq!(binding.apply(&[]), "");
}

#[test]
fn test_newest_record_is_rendered_first() {
    let snapshot = records(vec![
        review(ReviewKind::Contractor, "Older Co", 3, "fine"),
        review(ReviewKind::Contractor, "Newer Co", 5, "great"),
    ]);
    let mut binding = LiveBinding::new("contractor-reviews-list", ReviewRenderer);

    let html = binding.apply(&snapshot).to_string();

    let newer = html.find("Newer Co").unwrap();
    let older = html.find("Older Co").unwrap();
    assert!(newer < older);
}

#[test]
fn test_snapshot_fully_replaces_markup() {
    let mut binding = LiveBinding::new("incident-feed", IncidentRenderer);
    binding.apply(&records(vec![incident("first fire", 34.0, -118.5)]));

    let html = binding
        .apply(&records(vec![incident("second fire", 34.0, -118.5)]))
        .to_string();

    assert!(html.contains("second fire"));
    assert!(!html.contains("first fire"));
    assert_eq!(binding.html(), html);
}

#[test]
fn test_same_snapshot_twice_gives_same_markup() {
    let snapshot = records(vec![
        review(ReviewKind::Insurance, "Big Insurer", 2, "Slow <b>claims</b>"),
        review(ReviewKind::Insurance, "Small Mutual", 5, "Paid fast"),
    ]);
    let mut binding = LiveBinding::new("insurance-reviews-list", ReviewRenderer);

    let first = binding.apply(&snapshot).to_string();
    let second = binding.apply(&snapshot).to_string();

    assert_eq!(first, second);
    assert_eq!(binding.html(), first);
}

#[test]
fn test_limit_keeps_newest() {
    let payloads = (0..12)
        .map(|i| incident_with_image(&format!("house {i}"), &format!("https://img.test/{i}.jpg")))
        .collect();
    let mut binding = LiveBinding::new("address-gallery", GalleryRenderer).with_limit(10);

    let html = binding.apply(&records(payloads)).to_string();

    assert_eq!(html.matches("gallery-thumb").count(), 10);
    assert!(html.contains("https://img.test/11.jpg"));
    assert!(!html.contains("https://img.test/0.jpg"));
    assert!(!html.contains("https://img.test/1.jpg\""));
}

#[test]
fn test_other_kinds_are_skipped() {
    let snapshot = records(vec![
        incident("not a permit", 34.0, -118.5),
        permit("permit.pdf", "https://files.test/permit.pdf"),
    ]);
    let mut binding = LiveBinding::new("la-permits-list", PermitRenderer);

    let html = binding.apply(&snapshot).to_string();

    assert!(html.contains("permit.pdf"));
    assert!(!html.contains("not a permit"));
}

#[test]
fn test_failure_marks_only_its_container() {
    let mut failing = LiveBinding::new("incident-feed", IncidentRenderer);
    let mut healthy = LiveBinding::new("la-permits-list", PermitRenderer);

    failing.fail();
    healthy.apply(&[]);

    assert_eq!(failing.html(), SECTION_UNAVAILABLE);
    assert_eq!(healthy.html(), "<p>No permits uploaded yet.</p>");
}

#[test]
fn test_first_snapshot_is_silent_baseline() {
    let existing = records(vec![incident("old", 34.0, -118.5)]);
    let mut seen = SeenSet::default();

    assert!(seen.observe(&existing).is_empty());
    assert!(seen.contains(&existing[0].id));

    let mut next = existing.clone();
    next.extend(records(vec![incident("new", 34.0, -118.5)]));
    let fresh = seen.observe(&next);

    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].id, next[1].id);
}

#[test]
fn test_each_record_reported_once() {
    let mut seen = SeenSet::default();
    seen.observe(&[]);

    let snapshot = records(vec![incident("new", 34.0, -118.5)]);
    assert_eq!(seen.observe(&snapshot).len(), 1);
    assert!(seen.observe(&snapshot).is_empty());
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_notify_policy_reports_first_snapshot() {
    let existing = records(vec![
        incident("a", 34.0, -118.5),
        incident("b", 34.0, -118.5),
    ]);
    let mut seen = SeenSet::new(FirstSnapshot::Notify);

    assert_eq!(seen.observe(&existing).len(), 2);
}
