//! Database repositories
//!
//! Thin SQL wrappers. Business rules live in `services`.

pub mod attendance;
pub mod user;

pub use attendance::{AttendanceRepository, AttendanceRow};
pub use user::{UserRecord, UserRepository};
