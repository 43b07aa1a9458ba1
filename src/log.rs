//! Types used for the `/rosout` logging topic.
//!
//! See <https://docs.ros2.org/foxy/api/rcl_interfaces/msg/Log.html>

pub use crate::builtin_datatypes::Log;

/// ROS 2 log severity levels, as carried in [`Log::get_level`].
///
/// Numeric values match `rcl_interfaces/msg/Log` constants, so they can be
/// cast directly to the wire `u8`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
  Unset = 0,
  Debug = 10,
  Info = 20,
  Warn = 30,
  Error = 40,
  Fatal = 50,
}
