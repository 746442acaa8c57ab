pub mod assistant;
pub mod client;

pub use assistant::{ChatAssistant, OFFLINE_REPLY};
pub use client::{CompletionClient, HostedCompletionClient, OfflineCompletionClient};
