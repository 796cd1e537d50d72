//! JSON-file repository implementations.

mod attendance;
mod session;
mod user;

pub use attendance::JsonAttendanceRepository;
pub use session::JsonSessionRepository;
pub use user::JsonUserRepository;
