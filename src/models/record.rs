use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::{errors::AppError, models::geo::GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionName {
    #[serde(rename = "reviews_v1")]
    Reviews,
    #[serde(rename = "incidents_v1")]
    Incidents,
    #[serde(rename = "contractors")]
    Contractors,
    #[serde(rename = "la_permits_v1")]
    Permits,
}

impl CollectionName {
    pub const ALL: [CollectionName; 4] = [
        CollectionName::Reviews,
        CollectionName::Incidents,
        CollectionName::Contractors,
        CollectionName::Permits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Reviews => "reviews_v1",
            CollectionName::Incidents => "incidents_v1",
            CollectionName::Contractors => "contractors",
            CollectionName::Permits => "la_permits_v1",
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown collection {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    Contractor,
    Insurance,
}

impl ReviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewKind::Contractor => "contractor",
            ReviewKind::Insurance => "insurance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "type")]
    pub kind: ReviewKind,
    pub subject_name: String,
    pub rating: u8,
    pub review_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    pub name: String,
    pub license: String,
    #[serde(rename = "workmanComp")]
    pub workman_comp: String,
    pub liability: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permit {
    pub file_url: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Domain payload of a record, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordPayload {
    Review(Review),
    Incident(Incident),
    Contractor(Contractor),
    Permit(Permit),
}

impl RecordPayload {
    /// Reads a create body for `collection`. The collection decides the kind;
    /// a `kind` field is optional and must agree with it when present.
    pub fn from_body(
        collection: CollectionName,
        mut body: serde_json::Value,
    ) -> Result<Self, AppError> {
        let expected = Self::kind_for(collection);
        let Some(fields) = body.as_object_mut() else {
            return Err(AppError::BadRequest("Record body must be an object".into()));
        };
        match fields.remove("kind") {
            None => {}
            Some(serde_json::Value::String(kind)) if kind == expected => {}
            Some(other) => {
                return Err(AppError::BadRequest(format!(
                    "kind {other} does not belong in {collection}"
                )));
            }
        }

        let invalid = |e: serde_json::Error| AppError::Deserialization(e.to_string());
        Ok(match collection {
            CollectionName::Reviews => {
                RecordPayload::Review(serde_json::from_value(body).map_err(invalid)?)
            }
            CollectionName::Incidents => {
                RecordPayload::Incident(serde_json::from_value(body).map_err(invalid)?)
            }
            CollectionName::Contractors => {
                RecordPayload::Contractor(serde_json::from_value(body).map_err(invalid)?)
            }
            CollectionName::Permits => {
                RecordPayload::Permit(serde_json::from_value(body).map_err(invalid)?)
            }
        })
    }

    fn kind_for(collection: CollectionName) -> &'static str {
        match collection {
            CollectionName::Reviews => "review",
            CollectionName::Incidents => "incident",
            CollectionName::Contractors => "contractor",
            CollectionName::Permits => "permit",
        }
    }

    /// The only collection this payload kind may be stored in.
    pub fn collection(&self) -> CollectionName {
        match self {
            RecordPayload::Review(_) => CollectionName::Reviews,
            RecordPayload::Incident(_) => CollectionName::Incidents,
            RecordPayload::Contractor(_) => CollectionName::Contractors,
            RecordPayload::Permit(_) => CollectionName::Permits,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            RecordPayload::Review(r) => {
                require("subject_name", &r.subject_name)?;
                require("review_text", &r.review_text)?;
                if !(1..=5).contains(&r.rating) {
                    return Err(AppError::BadRequest(format!(
                        "rating must be between 1 and 5, got {}",
                        r.rating
                    )));
                }
                Ok(())
            }
            RecordPayload::Incident(i) => require("description", &i.description),
            RecordPayload::Contractor(c) => {
                require("name", &c.name)?;
                require("license", &c.license)
            }
            RecordPayload::Permit(p) => {
                require("file_url", &p.file_url)?;
                require("file_name", &p.file_name)
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

/// A backend-managed record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub username: String,
    #[serde(flatten)]
    pub payload: RecordPayload,
}

impl Record {
    pub fn new(username: impl Into<String>, payload: RecordPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            username: username.into(),
            payload,
        }
    }

    pub fn collection(&self) -> CollectionName {
        self.payload.collection()
    }

    pub fn location(&self) -> Option<&GeoPoint> {
        match &self.payload {
            RecordPayload::Incident(i) => Some(&i.location),
            RecordPayload::Contractor(c) => Some(&c.location),
            RecordPayload::Review(_) | RecordPayload::Permit(_) => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.payload {
            RecordPayload::Incident(i) => i.image_url.as_deref(),
            RecordPayload::Permit(p) => p.image_url.as_deref(),
            RecordPayload::Review(_) | RecordPayload::Contractor(_) => None,
        }
    }
}

/// Snapshot: the complete current list of records matching a subscription.
pub type Snapshot = Vec<Record>;
