//! Upasthiti Attendance — class session registry and the QR/geofence
//! attendance recorder.

pub mod recorder;
pub mod registry;

pub use recorder::AttendanceRecorder;
pub use registry::SessionRegistry;
