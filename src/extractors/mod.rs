//! Request extractors shared by resource handlers.

pub mod id;
pub use id::RecordId;
