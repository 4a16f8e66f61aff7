pub mod error;
pub mod module;
pub mod principal;
pub mod types;

pub use error::ServiceError;
pub use module::Module;
pub use principal::Principal;
pub use types::{new_id, now_rfc3339};
