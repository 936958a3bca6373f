// Quake Application Layer

pub mod cancel;
pub mod error;
pub mod queries;
pub mod retry;
pub mod state;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use error::AppError;
pub use retry::RetryPolicy;
pub use state::AppState;
