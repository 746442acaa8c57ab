pub mod get;
pub mod post;

pub use get::get_records;
pub use post::insert_record;
