pub mod api;
pub mod ui;

pub use api::*;
pub use ui::*;

use crate::AppError;

/// Runs warehouse-bound work off the async runtime; DuckDB calls block
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
