pub mod api;
pub mod models;
pub mod validate;

pub use api::Envelope;
pub use models::RecordKind;
