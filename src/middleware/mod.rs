pub mod auth;
pub mod detail;
pub mod response;

pub use auth::{authenticate, AuthUser};
pub use detail::expose_error_detail;
pub use response::{ApiResponse, ApiResult};
