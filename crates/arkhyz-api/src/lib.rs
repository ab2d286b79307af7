pub mod admin;
pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod router;

pub use dispatcher::{DispatchOptions, Dispatcher};
pub use error::ApiError;
pub use middleware::{AdminCredentials, require_admin};
pub use router::{AdminAccess, AppState, AppStateInner, build_router};
