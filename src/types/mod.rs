//! Type definitions for storepulse

mod analytics;
mod error;
mod metrics;
mod order;
mod window;

pub use analytics::*;
pub use error::*;
pub use metrics::*;
pub use order::*;
pub use window::*;
