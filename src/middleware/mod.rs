pub mod response;
pub mod session;

pub use response::{ApiResponse, ApiResult, GridResponse};
pub use session::{extract_session_id, CurrentWorkspace, SESSION_HEADER};
