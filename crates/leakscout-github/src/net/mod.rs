pub mod gate;
pub mod retry;
pub mod sleeper;

pub use gate::FetchGate;
pub use retry::{backoff_delay, classify_response, parse_retry_after, RetryPolicy, RetryStep};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
