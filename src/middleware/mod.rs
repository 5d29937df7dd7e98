pub mod auth;
pub mod body;
pub mod response;

pub use auth::{require_hod, require_teacher, AuthUser};
pub use body::JsonBody;
pub use response::{ApiResponse, ApiResult, Message};
