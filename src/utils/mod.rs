// Shared plumbing for every source client
pub mod constants;
pub mod delay;
mod errors;
pub mod fallback;
pub mod http;
pub mod limits;
pub mod retry;
mod wait_for_element;

pub use delay::{Sleeper, TokioSleeper, pause, random_delay, tokio_sleeper};
pub use errors::{SourceError, SourceResult};
pub use fallback::{Capture, FallbackChain, Strategy};
pub use retry::{RetryConfig, RetryFailure, Transient, retry_with_backoff};
pub use wait_for_element::wait_for_any;
