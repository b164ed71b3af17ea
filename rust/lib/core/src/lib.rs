pub mod envelope;
pub mod error;
pub mod module;
pub mod types;

pub use envelope::{Empty, Envelope, STATUS_ERROR, STATUS_SUCCESS};
pub use error::ServiceError;
pub use module::Module;
