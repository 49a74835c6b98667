//! Business logic services
//!
//! Services validate input, coordinate repositories and map failures onto
//! `ApiError`.

pub mod attendance;
pub mod user;

pub use attendance::AttendanceService;
pub use user::UserService;
