//! Interfaces to external collaborators.
//!
//! The core never authenticates users, computes attendance, delivers
//! notifications, or persists audit records itself; it consumes these
//! concerns through the narrow traits defined here. Implementations
//! live in the outer crates.
//!
//! # Modules
//!
//! - `attendance` - Attendance/allowance provider
//! - `notification` - Fire-and-forget notification sink
//! - `audit` - Asynchronous audit record sink

pub mod attendance;
pub mod audit;
pub mod notification;

pub use attendance::{AttendanceError, AttendanceProvider};
pub use audit::{AuditRecord, AuditSink, EntityKind};
pub use notification::{Notification, NotificationKind, NotificationSink};
