pub mod dataset;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod retrieval;

pub use prompt::ChatMode;
