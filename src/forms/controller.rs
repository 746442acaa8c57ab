use chrono::Utc;
use futures::future::try_join_all;
use std::{collections::HashMap, time::Duration};

use crate::{
    db::CollectionStore,
    errors::AppError,
    forms::{
        FileInput, FormKind, FormState, Uploader,
        mapping::{Draft, validate},
    },
    models::{Record, geo::LatLng},
};

pub const LOCATING: &str = "Getting your location... Please approve the request.";
pub const LOCATION_FALLBACK: &str =
    "Could not get location. Please click the incident location on the map to proceed.";
pub const LOCATION_SELECTED: &str = "Location selected on map. You can now submit.";

/// How long a geolocation request may go unanswered before it counts as denied.
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq)]
enum LocationState {
    Unknown,
    Requested,
    AwaitingMapClick,
    Selected(LatLng),
}

#[derive(Debug)]
pub enum BeginOutcome {
    /// Validated and locked; run the submission, then call `finish`.
    Ready(Submission),
    /// Locked; ask the client for its position and call `resolve_location`.
    /// `request` identifies this ask for `expire_location`.
    NeedsLocation { request: u64 },
    /// Validation failed; the inline message is in the state. No network call.
    Rejected,
    /// A submission is already in flight or waiting on the user.
    Busy,
}

/// One validated submission. Runs outside the controller so other actions stay
/// responsive while it is in flight.
#[derive(Debug)]
pub struct Submission {
    kind: FormKind,
    draft: Draft,
    files: Vec<FileInput>,
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Created(Record),
    /// Upload-only form finished.
    Uploaded(Vec<String>),
    UploadFailed(AppError),
    CreateFailed(AppError),
}

impl Submission {
    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Uploads every file, then issues exactly one create call. Nothing is
    /// created when any upload fails.
    pub async fn execute(
        self,
        store: &dyn CollectionStore,
        uploader: &dyn Uploader,
        author: &str,
    ) -> SubmissionOutcome {
        let uploaded = match try_join_all(self.files.iter().map(|f| uploader.upload(f))).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::error!("Upload for {:?} failed: {}", self.kind, e);
                return SubmissionOutcome::UploadFailed(e);
            }
        };

        let payload = match self.draft.into_payload(&uploaded, Utc::now()) {
            Ok(Some(payload)) => payload,
            Ok(None) => return SubmissionOutcome::Uploaded(uploaded),
            Err(e) => return SubmissionOutcome::CreateFailed(e),
        };

        let collection = payload.collection();
        match store.create(collection, author, payload).await {
            Ok(record) => {
                tracing::info!("{} created {} in {}", author, record.id, collection);
                SubmissionOutcome::Created(record)
            }
            Err(e) => {
                tracing::error!("Create in {} failed: {}", collection, e);
                SubmissionOutcome::CreateFailed(e)
            }
        }
    }
}

/// Headless state of one mutation form.
#[derive(Debug)]
pub struct FormController {
    kind: FormKind,
    state: FormState,
    files: Vec<FileInput>,
    location: LocationState,
    location_requests: u64,
    pending: Option<Draft>,
    map_center: LatLng,
}

impl FormController {
    pub fn new(kind: FormKind, map_center: LatLng) -> Self {
        Self {
            kind,
            state: FormState::idle(kind),
            files: Vec::new(),
            location: LocationState::Unknown,
            location_requests: 0,
            pending: None,
            map_center,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn staged_files(&self) -> &[FileInput] {
        &self.files
    }

    /// Stages a file. Single-file forms keep only the latest one.
    pub fn attach(&mut self, file: FileInput) {
        if self.kind != FormKind::ClaimDocuments {
            self.files.clear();
        }
        self.files.push(file);
    }

    pub fn begin(&mut self, fields: &HashMap<String, String>) -> BeginOutcome {
        if !self.state.submit_enabled {
            return BeginOutcome::Busy;
        }
        self.state.reset = false;

        let draft = match validate(self.kind, fields, &self.files, self.map_center) {
            Ok(draft) => draft,
            Err(message) => {
                self.state.status = Some(message);
                return BeginOutcome::Rejected;
            }
        };

        self.lock();

        match draft {
            Draft::Incident { description, .. } => match self.location {
                LocationState::Selected(at) => {
                    self.state.status = Some("Submitting report...".into());
                    BeginOutcome::Ready(self.submission(Draft::Incident {
                        description,
                        location: Some(at),
                    }))
                }
                _ => {
                    self.location = LocationState::Requested;
                    self.location_requests += 1;
                    self.pending = Some(Draft::Incident {
                        description,
                        location: None,
                    });
                    self.state.status = Some(LOCATING.into());
                    BeginOutcome::NeedsLocation {
                        request: self.location_requests,
                    }
                }
            },
            draft => {
                self.state.status = match self.kind {
                    FormKind::PermitUpload => Some("Uploading permit...".into()),
                    FormKind::ClaimDocuments => {
                        Some(format!("Uploading {} document(s)...", self.files.len()))
                    }
                    _ => None,
                };
                BeginOutcome::Ready(self.submission(draft))
            }
        }
    }

    /// Result of the geolocation request. `None` means permission was denied:
    /// the form stays locked until a map click supplies the location.
    pub fn resolve_location(&mut self, position: Option<LatLng>) -> Option<Submission> {
        if self.location != LocationState::Requested {
            return None;
        }
        let pending = self.pending.take();

        match (position, pending) {
            (Some(at), Some(Draft::Incident { description, .. })) => {
                self.location = LocationState::Unknown;
                self.state.status = Some("Submitting report...".into());
                Some(self.submission(Draft::Incident {
                    description,
                    location: Some(at),
                }))
            }
            (None, _) => {
                self.location = LocationState::AwaitingMapClick;
                self.state.submit_enabled = false;
                self.state.button_label = self.kind.idle_label();
                self.state.status = Some(LOCATION_FALLBACK.into());
                None
            }
            (Some(_), _) => {
                self.location = LocationState::Unknown;
                self.unlock();
                None
            }
        }
    }

    /// Treats an unanswered geolocation request as denied. Stale requests and
    /// requests already answered are ignored. Returns `true` when the form
    /// moved to the map-click fallback.
    pub fn expire_location(&mut self, request: u64) -> bool {
        if self.location != LocationState::Requested || request != self.location_requests {
            return false;
        }
        self.resolve_location(None);
        true
    }

    /// Returns `true` when the click was used as the incident location.
    pub fn map_click(&mut self, at: LatLng) -> bool {
        if self.location != LocationState::AwaitingMapClick {
            return false;
        }
        self.location = LocationState::Selected(at);
        self.unlock();
        self.state.status = Some(LOCATION_SELECTED.into());
        true
    }

    /// Applies a finished submission. Returns an alert to surface, if any.
    pub fn finish(&mut self, outcome: &SubmissionOutcome) -> Option<String> {
        self.unlock();
        match outcome {
            SubmissionOutcome::Created(_) | SubmissionOutcome::Uploaded(_) => {
                self.files.clear();
                self.location = LocationState::Unknown;
                self.state.reset = true;
                self.state.status = self.success_message().map(str::to_string);
                None
            }
            SubmissionOutcome::UploadFailed(_) => {
                self.state.status = Some(self.upload_failure_message().to_string());
                None
            }
            SubmissionOutcome::CreateFailed(_) => match self.kind {
                FormKind::ContractorReview | FormKind::InsuranceReview => {
                    self.state.status = None;
                    Some("Failed to submit review. Please try again.".to_string())
                }
                FormKind::ContractorRegistry => {
                    self.state.status = None;
                    Some("Error registering contractor. Please try again.".to_string())
                }
                FormKind::Incident => {
                    self.state.status = Some("Error submitting report. Please try again.".into());
                    None
                }
                FormKind::PermitUpload | FormKind::ClaimDocuments => {
                    self.state.status = Some(self.upload_failure_message().to_string());
                    None
                }
            },
        }
    }

    fn submission(&self, draft: Draft) -> Submission {
        Submission {
            kind: self.kind,
            draft,
            files: self.files.clone(),
        }
    }

    fn lock(&mut self) {
        self.state.submit_enabled = false;
        self.state.button_label = self.kind.busy_label();
    }

    fn unlock(&mut self) {
        self.state.submit_enabled = true;
        self.state.button_label = self.kind.idle_label();
    }

    fn success_message(&self) -> Option<&'static str> {
        match self.kind {
            FormKind::Incident => Some("Thank you! Your report has been submitted successfully."),
            FormKind::PermitUpload => Some("Permit uploaded successfully."),
            FormKind::ClaimDocuments => Some(
                "Upload complete! Claim tracking is now active. We will notify you of any updates.",
            ),
            FormKind::ContractorReview
            | FormKind::InsuranceReview
            | FormKind::ContractorRegistry => None,
        }
    }

    fn upload_failure_message(&self) -> &'static str {
        match self.kind {
            FormKind::Incident => "Error: Could not upload image. Please try again.",
            FormKind::ClaimDocuments => "Error: Could not upload documents. Please try again.",
            _ => "Error uploading permit. Please try again.",
        }
    }
}
