//! The Action Specification: an injected schema describing how to pack a
//! goal and unpack feedback/result/status out of their envelope messages.
//!
//! Everything above this module is message-shape agnostic: the CSM and
//! Manager only ever see `A::Goal`, `A::Feedback`, `A::Result` through the
//! accessor functions gathered here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  action_msgs::{GoalId, GoalStatus},
  builtin_interfaces::Time,
  message::Message,
};

/// The seven message-type identifiers a complete action needs to
/// resolve, named as in the wire protocol: the action itself, its
/// goal/feedback/result envelopes, and the three bare payload types.
#[derive(Debug)]
pub enum ActionMessageKind {
  Action,
  ActionFeedback,
  ActionGoal,
  ActionResult,
  Feedback,
  Goal,
  Result,
}

impl fmt::Display for ActionMessageKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ActionMessageKind::Action => "action",
      ActionMessageKind::ActionFeedback => "action feedback",
      ActionMessageKind::ActionGoal => "action goal",
      ActionMessageKind::ActionResult => "action result",
      ActionMessageKind::Feedback => "feedback",
      ActionMessageKind::Goal => "goal",
      ActionMessageKind::Result => "result",
    };
    write!(f, "{name}")
  }
}

/// Raised when an [`ActionTypes`] implementation cannot be resolved into a
/// usable schema: fatal to the client using it, since nothing below can be
/// assumed message-shape agnostic any more.
#[derive(Debug)]
pub struct SpecError {
  pub kind: ActionMessageKind,
  pub reason: String,
}

impl fmt::Display for SpecError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "action specification error on {}: {}", self.kind, self.reason)
  }
}

impl std::error::Error for SpecError {}

/// One submitted goal, wrapped with the bookkeeping the protocol needs:
/// a header stamp and the [`GoalId`] that ties feedback and result
/// messages back to this submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionGoal<G> {
  pub stamp: Time,
  pub goal_id: GoalId,
  pub goal: G,
}
impl<G: Message> Message for ActionGoal<G> {}

/// A feedback update for one goal, carrying the status the server had for
/// it at the time the feedback was produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionFeedback<F> {
  pub stamp: Time,
  pub status: GoalStatus,
  pub feedback: F,
}
impl<F: Message> Message for ActionFeedback<F> {}

/// The terminal outcome of one goal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionResult<R> {
  pub stamp: Time,
  pub status: GoalStatus,
  pub result: R,
}
impl<R: Message> Message for ActionResult<R> {}

/// Describes one action: its goal/feedback/result payload types, and how
/// to pack/unpack them from their envelopes.
///
/// Implementations are usually a zero-sized marker type; the associated
/// types carry the actual payload shapes, and `is_valid` is a hook for
/// implementations that need to validate something (e.g. a message
/// factory lookup) before the action can be used.
pub trait ActionTypes: Sized {
  type Goal: Message + Clone;
  type Feedback: Message + Clone;
  type Result: Message + Clone;

  /// The ROS action type name, e.g. `"turtlesim/RotateAbsolute"`.
  fn action_type_name() -> &'static str;

  /// Reports whether this specification is ready to pack/unpack
  /// messages. The default assumes no extra validation is needed.
  fn is_valid() -> Result<(), SpecError> {
    Ok(())
  }

  fn goal_of(action_goal: &ActionGoal<Self::Goal>) -> Self::Goal {
    action_goal.goal.clone()
  }

  fn result_of(action_result: &ActionResult<Self::Result>) -> Self::Result {
    action_result.result.clone()
  }

  fn feedback_of(action_feedback: &ActionFeedback<Self::Feedback>) -> Self::Feedback {
    action_feedback.feedback.clone()
  }

  fn goal_id_of(action_goal: &ActionGoal<Self::Goal>) -> GoalId {
    action_goal.goal_id.clone()
  }

  fn status_of_feedback(action_feedback: &ActionFeedback<Self::Feedback>) -> GoalStatus {
    action_feedback.status.clone()
  }

  fn status_of_result(action_result: &ActionResult<Self::Result>) -> GoalStatus {
    action_result.status.clone()
  }

  fn new_action_goal(goal: Self::Goal, stamp: Time, goal_id: GoalId) -> ActionGoal<Self::Goal> {
    ActionGoal { stamp, goal_id, goal }
  }

  fn new_action_feedback(
    feedback: Self::Feedback,
    stamp: Time,
    status: GoalStatus,
  ) -> ActionFeedback<Self::Feedback> {
    ActionFeedback { stamp, status, feedback }
  }

  fn new_action_result(
    result: Self::Result,
    stamp: Time,
    status: GoalStatus,
  ) -> ActionResult<Self::Result> {
    ActionResult { stamp, status, result }
  }
}
