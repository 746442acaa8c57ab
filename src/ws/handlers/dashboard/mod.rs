pub mod handler;
pub mod message_handler;
pub mod sections;
pub mod utils;

pub use handler::dashboard_handler;
