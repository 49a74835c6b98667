//! Gym Dashboard Shared Library
//!
//! Calculator formulas, attendance analytics and API types shared by the
//! backend and the WASM module.

pub mod attendance;
pub mod errors;
pub mod health_metrics;
pub mod session;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use attendance::*;
pub use errors::*;
pub use health_metrics::*;
pub use session::SessionContext;
pub use types::*;
