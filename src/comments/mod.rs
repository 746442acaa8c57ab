pub mod client;
pub mod feed;

pub use client::{CommentSource, HostingClient, OfflineComments};
pub use feed::{COMMENTS_UNAVAILABLE, CommentsFeed, CommentsUpdate};
