use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::{
    errors::AppError,
    forms::{FileInput, FormKind},
    models::{
        RecordPayload,
        geo::{GeoPoint, LatLng},
        record::{Contractor, Incident, Permit, Review, ReviewKind},
    },
};

pub const MISSING_REQUIRED: &str = "Please fill in all required fields.";
pub const INVALID_RATING: &str = "Please choose a rating between 1 and 5.";
pub const MISSING_DESCRIPTION: &str = "Please enter a description.";
pub const MISSING_PERMIT_FILE: &str = "Please select a permit file.";
pub const MISSING_CLAIM_DOCS: &str = "Please select at least one document to upload.";

/// Validated form input, waiting for uploads (and, for incidents, a location).
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Review {
        kind: ReviewKind,
        subject_name: String,
        rating: u8,
        review_text: String,
    },
    Incident {
        description: String,
        location: Option<LatLng>,
    },
    Contractor {
        name: String,
        license: String,
        workman_comp: String,
        liability: String,
        location: LatLng,
    },
    Permit {
        file_name: String,
    },
    Claim,
}

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map(|v| v.trim()).unwrap_or("")
}

fn required(fields: &HashMap<String, String>, name: &str) -> Result<String, String> {
    let value = field(fields, name);
    if value.is_empty() {
        return Err(MISSING_REQUIRED.to_string());
    }
    Ok(value.to_string())
}

fn map_location(fields: &HashMap<String, String>, fallback: LatLng) -> LatLng {
    let lat = field(fields, "map_lat").parse::<f64>().ok();
    let lng = field(fields, "map_lng").parse::<f64>().ok();
    match (lat, lng) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => LatLng { lat, lng },
        _ => fallback,
    }
}

/// Checks the fixed field mapping of `kind`. `Err` carries the inline message.
pub fn validate(
    kind: FormKind,
    fields: &HashMap<String, String>,
    files: &[FileInput],
    map_center: LatLng,
) -> Result<Draft, String> {
    match kind {
        FormKind::ContractorReview | FormKind::InsuranceReview => {
            let subject_name = required(fields, "subject_name")?;
            let review_text = required(fields, "review_text")?;
            let rating = field(fields, "rating")
                .parse::<i64>()
                .ok()
                .filter(|r| (1..=5).contains(r))
                .ok_or_else(|| INVALID_RATING.to_string())?;
            Ok(Draft::Review {
                kind: kind.review_kind().unwrap_or(ReviewKind::Contractor),
                subject_name,
                rating: rating as u8,
                review_text,
            })
        }
        FormKind::Incident => {
            let description = field(fields, "description");
            if description.is_empty() {
                return Err(MISSING_DESCRIPTION.to_string());
            }
            Ok(Draft::Incident {
                description: description.to_string(),
                location: None,
            })
        }
        FormKind::ContractorRegistry => Ok(Draft::Contractor {
            name: required(fields, "name")?,
            license: required(fields, "license")?,
            workman_comp: field(fields, "workman_comp").to_string(),
            liability: field(fields, "liability").to_string(),
            location: map_location(fields, map_center),
        }),
        FormKind::PermitUpload => match files.first() {
            Some(file) => Ok(Draft::Permit {
                file_name: file.name.clone(),
            }),
            None => Err(MISSING_PERMIT_FILE.to_string()),
        },
        FormKind::ClaimDocuments => {
            if files.is_empty() {
                return Err(MISSING_CLAIM_DOCS.to_string());
            }
            Ok(Draft::Claim)
        }
    }
}

impl Draft {
    /// Builds the create-call payload from uploaded file URLs (in file order).
    /// `Ok(None)` for upload-only drafts.
    pub fn into_payload(
        self,
        uploaded: &[String],
        now: DateTime<Utc>,
    ) -> Result<Option<RecordPayload>, AppError> {
        let payload = match self {
            Draft::Review {
                kind,
                subject_name,
                rating,
                review_text,
            } => RecordPayload::Review(Review {
                kind,
                subject_name,
                rating,
                review_text,
            }),
            Draft::Incident {
                description,
                location,
            } => {
                let location = location.ok_or_else(|| {
                    AppError::BadRequest("incident location was not acquired".into())
                })?;
                RecordPayload::Incident(Incident {
                    description,
                    image_url: uploaded.first().cloned(),
                    location: GeoPoint::from_lat_lng(location),
                })
            }
            Draft::Contractor {
                name,
                license,
                workman_comp,
                liability,
                location,
            } => RecordPayload::Contractor(Contractor {
                name,
                license,
                workman_comp,
                liability,
                location: GeoPoint::from_lat_lng(location),
            }),
            Draft::Permit { file_name } => {
                let file_url = uploaded.first().cloned().ok_or_else(|| {
                    AppError::BadRequest("permit file was not uploaded".into())
                })?;
                RecordPayload::Permit(Permit {
                    file_url,
                    file_name,
                    uploaded_at: now,
                    image_url: None,
                })
            }
            Draft::Claim => return Ok(None),
        };
        Ok(Some(payload))
    }
}
