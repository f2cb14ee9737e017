pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{VariantError, VariantResult};
pub use types::{Arm, FeedbackAction};
