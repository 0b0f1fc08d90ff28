pub mod logging;
pub mod retry;

pub use logging::truncate_text;
pub use retry::{retry_with_backoff, LinearBackoff};
