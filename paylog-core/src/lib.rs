pub mod config;
pub mod entry;
pub mod error;
pub mod store;

pub use config::{ConfigOverrides, RecorderConfig};
pub use entry::LogEntry;
pub use error::RecorderError;
pub use store::CaptureStore;
