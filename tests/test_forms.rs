mod common;

use common::{CountingStore, FakeUploader, file};
use std::collections::HashMap;

use recovery_hub::{
    db::CollectionStore,
    forms::{
        BeginOutcome, FormController, FormKind, Submission, SubmissionOutcome,
        controller::{LOCATING, LOCATION_FALLBACK, LOCATION_SELECTED},
        mapping::{MISSING_CLAIM_DOCS, MISSING_REQUIRED},
    },
    models::{CollectionName, RecordPayload, geo::LatLng},
};

const CENTER: LatLng = LatLng {
    lat: 34.055,
    lng: -118.54,
};

fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn ready(outcome: BeginOutcome) -> Submission {
    match outcome {
        BeginOutcome::Ready(submission) => submission,
        other => panic!("expected a ready submission, got {other:?}"),
    }
}

#[tokio::test]
async fn test_review_submission_creates_one_record() {
    let store = CountingStore::new();
    let uploader = FakeUploader::ok();
    let mut form = FormController::new(FormKind::ContractorReview, CENTER);

    let submission = ready(form.begin(&fields(&[
        ("subject_name", "Acme Roofing"),
        ("rating", "4"),
        ("review_text", "Great work"),
    ])));
    assert!(!form.state().submit_enabled);
    assert_eq!(form.state().button_label, "Submitting...");

    let outcome = submission.execute(&store, &uploader, "alice").await;
    let alert = form.finish(&outcome);

    assert!(alert.is_none());
    assert_eq!(store.create_calls(), 1);
    let SubmissionOutcome::Created(record) = outcome else {
        panic!("expected a created record");
    };
    let json = serde_json::to_value(&record.payload).unwrap();
    assert_eq!(json["type"], "contractor");
    assert_eq!(json["subject_name"], "Acme Roofing");
    assert_eq!(json["rating"], 4);
    assert_eq!(json["review_text"], "Great work");
    assert_eq!(record.username, "alice");

    assert!(form.state().reset);
    assert!(form.state().submit_enabled);
    assert_eq!(form.state().button_label, "Submit Review");
}

#[tokio::test]
async fn test_missing_field_never_calls_backend() {
    let mut form = FormController::new(FormKind::InsuranceReview, CENTER);

    let outcome = form.begin(&fields(&[
        ("subject_name", ""),
        ("rating", "3"),
        ("review_text", "Slow payout"),
    ]));

    assert!(matches!(outcome, BeginOutcome::Rejected));
    assert_eq!(form.state().status.as_deref(), Some(MISSING_REQUIRED));
    assert!(form.state().submit_enabled);
}

#[tokio::test]
async fn test_duplicate_submit_is_ignored() {
    let mut form = FormController::new(FormKind::ContractorReview, CENTER);
    let input = fields(&[
        ("subject_name", "Acme"),
        ("rating", "5"),
        ("review_text", "Fast"),
    ]);

    let _in_flight = ready(form.begin(&input));

    assert!(matches!(form.begin(&input), BeginOutcome::Busy));
}

#[tokio::test]
async fn test_upload_failure_skips_create_and_keeps_input() {
    let store = CountingStore::new();
    let uploader = FakeUploader::failing();
    let mut form = FormController::new(FormKind::PermitUpload, CENTER);
    form.attach(file("plans.pdf"));

    let submission = ready(form.begin(&HashMap::new()));
    let outcome = submission.execute(&store, &uploader, "bob").await;
    form.finish(&outcome);

    assert!(matches!(outcome, SubmissionOutcome::UploadFailed(_)));
    assert_eq!(uploader.upload_calls(), 1);
    assert_eq!(store.create_calls(), 0);
    assert!(form.state().submit_enabled);
    assert!(!form.state().reset);
    assert_eq!(
        form.state().status.as_deref(),
        Some("Error uploading permit. Please try again.")
    );
    assert_eq!(form.staged_files().len(), 1);
}

#[tokio::test]
async fn test_permit_upload_records_file_url() {
    let store = CountingStore::new();
    let uploader = FakeUploader::ok();
    let mut form = FormController::new(FormKind::PermitUpload, CENTER);
    form.attach(file("old.pdf"));
    form.attach(file("plans.pdf"));

    let outcome = ready(form.begin(&HashMap::new()))
        .execute(&store, &uploader, "bob")
        .await;
    form.finish(&outcome);

    let permits = store.list(CollectionName::Permits, None).await.unwrap();
    assert_eq!(permits.len(), 1);
    match &permits[0].payload {
        RecordPayload::Permit(p) => {
            assert_eq!(p.file_name, "plans.pdf");
            assert_eq!(p.file_url, "https://cdn.test/plans.pdf");
        }
        other => panic!("unexpected payload {other:?}"),
    }
    assert_eq!(form.state().status.as_deref(), Some("Permit uploaded successfully."));
    assert!(form.staged_files().is_empty());
}

#[tokio::test]
async fn test_create_failure_alerts_and_reenables() {
    let store = CountingStore::failing();
    let uploader = FakeUploader::ok();
    let mut form = FormController::new(FormKind::ContractorReview, CENTER);

    let outcome = ready(form.begin(&fields(&[
        ("subject_name", "Acme"),
        ("rating", "2"),
        ("review_text", "Late"),
    ])))
    .execute(&store, &uploader, "carol")
    .await;
    let alert = form.finish(&outcome);

    assert_eq!(
        alert.as_deref(),
        Some("Failed to submit review. Please try again.")
    );
    assert!(form.state().submit_enabled);
    assert!(!form.state().reset);
}

#[tokio::test]
async fn test_denied_geolocation_falls_back_to_map_click() {
    let store = CountingStore::new();
    let uploader = FakeUploader::ok();
    let mut form = FormController::new(FormKind::Incident, CENTER);
    let input = fields(&[("description", "Downed power line")]);

    assert!(matches!(form.begin(&input), BeginOutcome::NeedsLocation { .. }));
    assert_eq!(form.state().status.as_deref(), Some(LOCATING));

    assert!(form.resolve_location(None).is_none());
    assert!(!form.state().submit_enabled);
    assert_eq!(form.state().status.as_deref(), Some(LOCATION_FALLBACK));
    assert_eq!(store.create_calls(), 0);

    assert!(form.map_click(LatLng {
        lat: 34.05,
        lng: -118.54
    }));
    assert!(form.state().submit_enabled);
    assert_eq!(form.state().status.as_deref(), Some(LOCATION_SELECTED));

    let outcome = ready(form.begin(&input))
        .execute(&store, &uploader, "dana")
        .await;
    form.finish(&outcome);

    assert_eq!(store.create_calls(), 1);
    let SubmissionOutcome::Created(record) = outcome else {
        panic!("expected a created record");
    };
    let point = record.location().unwrap();
    assert_eq!(point.coordinates, [-118.54, 34.05]);
    assert_eq!(
        form.state().status.as_deref(),
        Some("Thank you! Your report has been submitted successfully.")
    );
}

#[tokio::test]
async fn test_granted_geolocation_submits_immediately() {
    let store = CountingStore::new();
    let uploader = FakeUploader::ok();
    let mut form = FormController::new(FormKind::Incident, CENTER);
    form.attach(file("smoke.jpg"));

    assert!(matches!(
        form.begin(&fields(&[("description", "Smoke")])),
        BeginOutcome::NeedsLocation { .. }
    ));
    let submission = form
        .resolve_location(Some(LatLng {
            lat: 34.06,
            lng: -118.53,
        }))
        .expect("submission after granted location");

    let outcome = submission.execute(&store, &uploader, "eve").await;

    let SubmissionOutcome::Created(record) = outcome else {
        panic!("expected a created record");
    };
    assert_eq!(record.image_url(), Some("https://cdn.test/smoke.jpg"));
    assert_eq!(record.location().unwrap().lat(), 34.06);
}

#[test]
fn test_unanswered_geolocation_falls_back_to_map_click() {
    let mut form = FormController::new(FormKind::Incident, CENTER);
    let input = fields(&[("description", "Embers on the roof")]);

    let BeginOutcome::NeedsLocation { request } = form.begin(&input) else {
        panic!("expected a location request");
    };
    assert!(!form.expire_location(request + 1));
    assert_eq!(form.state().status.as_deref(), Some(LOCATING));

    assert!(form.expire_location(request));
    assert!(!form.state().submit_enabled);
    assert_eq!(form.state().status.as_deref(), Some(LOCATION_FALLBACK));
    assert!(!form.expire_location(request));

    assert!(form.map_click(CENTER));
    assert!(form.state().submit_enabled);
}

#[test]
fn test_answered_geolocation_is_not_expired() {
    let mut form = FormController::new(FormKind::Incident, CENTER);

    let BeginOutcome::NeedsLocation { request } =
        form.begin(&fields(&[("description", "Smoke")]))
    else {
        panic!("expected a location request");
    };
    assert!(form.resolve_location(Some(CENTER)).is_some());

    assert!(!form.expire_location(request));
    assert_eq!(form.state().status.as_deref(), Some("Submitting report..."));
}

#[tokio::test]
async fn test_map_click_ignored_unless_waiting() {
    let mut form = FormController::new(FormKind::Incident, CENTER);

    assert!(!form.map_click(LatLng {
        lat: 34.0,
        lng: -118.0
    }));
}

#[tokio::test]
async fn test_contractor_location_defaults_to_map_center() {
    let store = CountingStore::new();
    let uploader = FakeUploader::ok();
    let mut form = FormController::new(FormKind::ContractorRegistry, CENTER);

    let outcome = ready(form.begin(&fields(&[
        ("name", "BuildCo"),
        ("license", "CSLB-123"),
        ("workman_comp", "WC-9"),
        ("liability", "LI-9"),
    ])))
    .execute(&store, &uploader, "frank")
    .await;

    let SubmissionOutcome::Created(record) = outcome else {
        panic!("expected a created record");
    };
    assert_eq!(record.location().unwrap().to_lat_lng(), CENTER);
}

#[tokio::test]
async fn test_claim_documents_upload_without_create() {
    let store = CountingStore::new();
    let uploader = FakeUploader::ok();
    let mut form = FormController::new(FormKind::ClaimDocuments, CENTER);

    assert!(matches!(
        form.begin(&HashMap::new()),
        BeginOutcome::Rejected
    ));
    assert_eq!(form.state().status.as_deref(), Some(MISSING_CLAIM_DOCS));

    form.attach(file("receipt.pdf"));
    form.attach(file("photo.jpg"));
    let outcome = ready(form.begin(&HashMap::new()))
        .execute(&store, &uploader, "gus")
        .await;
    form.finish(&outcome);

    assert!(matches!(outcome, SubmissionOutcome::Uploaded(ref urls) if urls.len() == 2));
    assert_eq!(uploader.upload_calls(), 2);
    assert_eq!(store.create_calls(), 0);
    assert!(form.state().reset);
}
