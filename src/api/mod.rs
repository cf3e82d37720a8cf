pub mod error;
pub mod predict;

pub use error::{ApiError, ErrorResponse};
pub use predict::{PredictResponse, handle_line, predict};
