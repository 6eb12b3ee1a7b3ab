//! Transformation module.
//!
//! - Timestamp: start time -> session date and weekday
//! - Grouper: flat rows -> date -> class -> students
//! - Pipeline: fetch/parse/group orchestration

pub mod grouper;
pub mod pipeline;
pub mod timestamp;

pub use grouper::group_attendance;
pub use pipeline::*;
pub use timestamp::{parse_session_date, weekday_name};
