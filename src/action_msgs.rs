//! Wire messages for the action protocol: goal identifiers and the status
//! reports an action server broadcasts for every goal it knows about.
//!
//! Unlike ROS2's service-based actions, these travel as plain
//! publish/subscribe topics: one goal-status topic carries a
//! [`GoalStatusArray`] listing every live goal, feedback and result are
//! per-action topics carrying envelopes keyed by [`GoalId`], and cancellation
//! is a single [`GoalId`] published on its own topic.

use log::error;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_repr::Serialize_repr;

use crate::{builtin_interfaces::Time, message::Message};

/// Identifies one submitted goal.
///
/// Equality and hashing are defined on `id` alone: two `GoalId`s that carry
/// the same id but different stamps refer to the same goal. `stamp` is the
/// time the goal was submitted, or, on a cancel message, a qualifier (see
/// [`GoalId::ZERO`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalId {
  pub id: String,
  pub stamp: Time,
}

impl GoalId {
  /// The all-zero id, used on the cancel topic to mean "every goal" (when
  /// paired with a zero stamp) or "every goal accepted at or before stamp".
  pub const ZERO: GoalId = GoalId { id: String::new(), stamp: Time::ZERO };

  pub fn new(id: String, stamp: Time) -> Self {
    GoalId { id, stamp }
  }
}

impl Message for GoalId {}

impl PartialEq for GoalId {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}
impl Eq for GoalId {}

impl std::hash::Hash for GoalId {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

/// Status of a goal as reported by the action server.
///
/// Numeric values match the classic `actionlib_msgs/GoalStatus` constants,
/// so wire bytes from any implementation of this protocol decode the same
/// way here.
#[derive(Clone, Copy, Serialize_repr, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ServerStatus {
  Pending = 0,
  Active = 1,
  Preempted = 2,
  Succeeded = 3,
  Aborted = 4,
  Rejected = 5,
  Preempting = 6,
  Recalling = 7,
  Recalled = 8,
  Lost = 9,
}

impl ServerStatus {
  /// Decode a status code off the wire (§6: "status codes: 0..9"). Anything
  /// outside that range is an UnknownStatusCode condition: the caller should
  /// log it and refuse to transition.
  pub fn from_code(code: u8) -> Option<Self> {
    match code {
      0 => Some(ServerStatus::Pending),
      1 => Some(ServerStatus::Active),
      2 => Some(ServerStatus::Preempted),
      3 => Some(ServerStatus::Succeeded),
      4 => Some(ServerStatus::Aborted),
      5 => Some(ServerStatus::Rejected),
      6 => Some(ServerStatus::Preempting),
      7 => Some(ServerStatus::Recalling),
      8 => Some(ServerStatus::Recalled),
      9 => Some(ServerStatus::Lost),
      _ => None,
    }
  }
}

/// Deserialized by hand, rather than via `serde_repr`, so an out-of-range
/// wire code hits [`ServerStatus::from_code`] and fails deserialization
/// with an `UnknownStatusCode` (§7) instead of being accepted silently.
impl<'de> Deserialize<'de> for ServerStatus {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let code = u8::deserialize(deserializer)?;
    ServerStatus::from_code(code).ok_or_else(|| {
      error!("unknown ServerStatus code {code} on the wire");
      D::Error::custom(format!("unknown ServerStatus code {code}"))
    })
  }
}

/// One entry in a [`GoalStatusArray`]: the status of a single goal, with an
/// optional human-readable explanation (e.g. a rejection reason).
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GoalStatus {
  pub goal_id: GoalId,
  pub status: ServerStatus,
  pub text: String,
}
impl Message for GoalStatus {}

/// Periodic broadcast of the status of every goal the server currently
/// knows about. Published on a single topic shared by all goals of an
/// action.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct GoalStatusArray {
  pub status_list: Vec<GoalStatus>,
}
impl Message for GoalStatusArray {}

impl GoalStatusArray {
  /// Find the status entry for a given goal, if the server reported one in
  /// this update.
  pub fn find(&self, goal_id: &GoalId) -> Option<&GoalStatus> {
    self.status_list.iter().find(|gs| &gs.goal_id == goal_id)
  }
}
