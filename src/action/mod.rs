//! Client-side runtime for the action protocol: long-running goals
//! submitted to a remote action server, tracked through an asynchronous
//! stream of status and feedback messages until a terminal result
//! arrives.
//!
//! Submodules, leaves first:
//! - [`spec`]: the [`ActionTypes`] schema an action is built from.
//! - [`goal_id`]: unique goal-id generation.
//! - [`state`]: the per-goal communication state machine.
//! - [`handle`]: [`GoalHandle`], the client's reference to a goal.
//! - [`manager`]: [`GoalManager`], which owns every live handle for one
//!   action and wires them to the transport.

mod goal_id;
mod handle;
mod manager;
mod spec;
mod state;

pub use goal_id::GoalIdGenerator;
pub use handle::{Callbacks, GoalHandle};
pub use manager::{ActionClientQosPolicies, GoalManager};
pub use spec::{ActionFeedback, ActionGoal, ActionMessageKind, ActionResult, ActionTypes, SpecError};
pub use state::{CommState, TerminalState};
