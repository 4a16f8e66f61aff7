mod provider;
mod session;
mod user;

pub use provider::*;
pub use session::*;
pub use user::*;
