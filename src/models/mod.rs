pub mod chat;
pub mod comment;
pub mod dashboard;
pub mod geo;
pub mod record;
pub mod redis;

pub use record::{CollectionName, Record, RecordPayload, Snapshot};
