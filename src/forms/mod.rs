pub mod controller;
pub mod mapping;
pub mod upload;

use serde::{Deserialize, Serialize};

use crate::models::{CollectionName, record::ReviewKind};

pub use controller::{BeginOutcome, FormController, Submission, SubmissionOutcome};
pub use upload::{FileInput, LocalUploader, Uploader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    ContractorReview,
    InsuranceReview,
    Incident,
    ContractorRegistry,
    PermitUpload,
    ClaimDocuments,
}

impl FormKind {
    pub const ALL: [FormKind; 6] = [
        FormKind::ContractorReview,
        FormKind::InsuranceReview,
        FormKind::Incident,
        FormKind::ContractorRegistry,
        FormKind::PermitUpload,
        FormKind::ClaimDocuments,
    ];

    /// Target collection of the create call. `None` for upload-only forms.
    pub fn collection(&self) -> Option<CollectionName> {
        match self {
            FormKind::ContractorReview | FormKind::InsuranceReview => {
                Some(CollectionName::Reviews)
            }
            FormKind::Incident => Some(CollectionName::Incidents),
            FormKind::ContractorRegistry => Some(CollectionName::Contractors),
            FormKind::PermitUpload => Some(CollectionName::Permits),
            FormKind::ClaimDocuments => None,
        }
    }

    pub fn review_kind(&self) -> Option<ReviewKind> {
        match self {
            FormKind::ContractorReview => Some(ReviewKind::Contractor),
            FormKind::InsuranceReview => Some(ReviewKind::Insurance),
            _ => None,
        }
    }

    pub fn idle_label(&self) -> &'static str {
        match self {
            FormKind::ContractorReview | FormKind::InsuranceReview => "Submit Review",
            FormKind::Incident => "Submit Report",
            FormKind::ContractorRegistry => "Register Contractor",
            FormKind::PermitUpload => "Upload Permit",
            FormKind::ClaimDocuments => "Track Claim",
        }
    }

    pub fn busy_label(&self) -> &'static str {
        match self {
            FormKind::ContractorReview | FormKind::InsuranceReview => "Submitting...",
            FormKind::Incident => "Processing...",
            FormKind::ContractorRegistry => "Registering...",
            FormKind::PermitUpload | FormKind::ClaimDocuments => "Uploading...",
        }
    }
}

/// What the client should show for one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub submit_enabled: bool,
    pub button_label: &'static str,
    pub status: Option<String>,
    /// Set on the transition that cleared the form inputs.
    pub reset: bool,
}

impl FormState {
    pub fn idle(kind: FormKind) -> Self {
        Self {
            submit_enabled: true,
            button_label: kind.idle_label(),
            status: None,
            reset: false,
        }
    }
}
