pub mod collection;
pub mod kyc;
pub mod upload;
pub mod webhook;
pub mod whatsapp;

pub use collection::{create_record_handler, list_records_handler};
pub use kyc::verify_kyc_handler;
pub use upload::upload_handler;
pub use webhook::comment_created_handler;
pub use whatsapp::subscribe_whatsapp_handler;
