pub mod collection;
pub mod dashboard;

pub use collection::collection_ws_handler;
pub use dashboard::dashboard_handler;
