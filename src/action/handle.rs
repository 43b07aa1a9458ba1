//! The client's reference to one in-flight goal.

use std::sync::{atomic::{AtomicBool, Ordering}, Arc, Mutex, Weak};

use log::{error, warn};

use crate::{
  action::{
    manager::ManagerInner,
    spec::{ActionGoal, ActionTypes},
    state::{Csm, CommState, TerminalState},
  },
  action_msgs::{GoalId, GoalStatus},
  builtin_interfaces::Time,
};

/// User-supplied observers for one goal. Either may be absent.
///
/// Both callbacks run synchronously, with the goal's CSM lock held (see
/// [`Csm`]): they must not call back into this same handle's mutating
/// operations, though they may freely act on other handles.
#[derive(Default)]
pub struct Callbacks<A: ActionTypes> {
  pub on_transition: Option<Box<dyn FnMut(&GoalHandle<A>, CommState) + Send>>,
  pub on_feedback: Option<Box<dyn FnMut(&GoalHandle<A>, A::Feedback) + Send>>,
}

pub(crate) struct GoalHandleInner<A: ActionTypes> {
  pub(crate) action_goal: ActionGoal<A::Goal>,
  pub(crate) csm: Csm,
  pub(crate) latest_result: Mutex<Option<A::Result>>,
  pub(crate) callbacks: Mutex<Callbacks<A>>,
  pub(crate) active: AtomicBool,
  pub(crate) manager: Weak<ManagerInner<A>>,
}

/// The client's handle to a submitted goal.
///
/// Created active by the [`GoalManager`](super::manager::GoalManager) that
/// submitted the goal. Once [`shutdown`](GoalHandle::shutdown) has run, the
/// handle is inert: every operation logs the misuse and returns a safe
/// default rather than touching the (possibly already-freed) CSM.
#[derive(Clone)]
pub struct GoalHandle<A: ActionTypes> {
  pub(crate) inner: Arc<GoalHandleInner<A>>,
}

impl<A: ActionTypes> GoalHandle<A> {
  pub(crate) fn new(action_goal: ActionGoal<A::Goal>, manager: Weak<ManagerInner<A>>) -> Self {
    GoalHandle {
      inner: Arc::new(GoalHandleInner {
        action_goal,
        csm: Csm::new(),
        latest_result: Mutex::new(None),
        callbacks: Mutex::new(Callbacks::default()),
        active: AtomicBool::new(true),
        manager,
      }),
    }
  }

  pub fn goal_id(&self) -> &GoalId {
    &self.inner.action_goal.goal_id
  }

  pub fn set_callbacks(&self, callbacks: Callbacks<A>) {
    *self.inner.callbacks.lock().unwrap() = callbacks;
  }

  fn is_active(&self) -> bool {
    self.inner.active.load(Ordering::Acquire)
  }

  /// Current [`CommState`]. Logs and returns `Done` if the handle has
  /// been shut down.
  pub fn comm_state(&self) -> CommState {
    if !self.is_active() {
      error!("comm_state() called on an inactive goal handle ({})", self.goal_id().id);
      return CommState::Done;
    }
    self.inner.csm.comm_state()
  }

  /// The terminal outcome. Returns `Lost` (and logs) on an inactive
  /// handle, and warns (but still computes) if the CSM has not reached
  /// `Done` yet.
  pub fn terminal_state(&self) -> TerminalState {
    if !self.is_active() {
      error!("terminal_state() called on an inactive goal handle ({})", self.goal_id().id);
      return TerminalState::Lost;
    }
    if self.inner.csm.comm_state() != CommState::Done {
      warn!(
        "terminal_state() called before goal {} reached Done (currently {:?})",
        self.goal_id().id,
        self.inner.csm.comm_state()
      );
    }
    self.inner.csm.terminal_state()
  }

  pub fn goal_status(&self) -> Option<GoalStatus> {
    self.inner.csm.latest_status()
  }

  /// The goal's result, if one has arrived. Only ever `Some` once
  /// [`comm_state`](Self::comm_state) is `Done`.
  pub fn result(&self) -> Option<A::Result> {
    self.inner.latest_result.lock().unwrap().clone()
  }

  /// Re-publish the original goal envelope via the owning manager.
  pub fn resend(&self) {
    if !self.is_active() {
      error!("resend() called on an inactive goal handle ({})", self.goal_id().id);
      return;
    }
    match self.inner.manager.upgrade() {
      Some(manager) => manager.publish_goal(&self.inner.action_goal),
      None => error!("resend() called after the owning manager was dropped"),
    }
  }

  /// Publish a cancel message for this goal and optimistically advance to
  /// `WaitingForCancelAck`. Does not wait for the server to acknowledge.
  pub fn cancel(&self) {
    if !self.is_active() {
      error!("cancel() called on an inactive goal handle ({})", self.goal_id().id);
      return;
    }
    let cancel_id = GoalId::new(self.goal_id().id.clone(), Time::ZERO);
    match self.inner.manager.upgrade() {
      Some(manager) => manager.publish_cancel(&cancel_id),
      None => error!("cancel() called after the owning manager was dropped"),
    }
    self.transition_to(CommState::WaitingForCancelAck);
  }

  /// Deactivate the handle. If `delete_from_manager` is set, also asks
  /// the owning manager to forget this goal. Calling this twice is a
  /// no-op the second time.
  pub fn shutdown(&self, delete_from_manager: bool) {
    let was_active = self.inner.active.swap(false, Ordering::AcqRel);
    if !was_active {
      return;
    }
    if delete_from_manager {
      if let Some(manager) = self.inner.manager.upgrade() {
        manager.forget(self.goal_id());
      }
    }
  }

  pub(crate) fn transition_to(&self, new_state: CommState) {
    let handle = self.clone();
    self.inner.csm.transition_to(new_state, |s| handle.fire_transition(s));
  }

  pub(crate) fn dispatch_status(&self, matching: Option<&GoalStatus>) {
    if !self.is_active() {
      return;
    }
    let handle = self.clone();
    self.inner.csm.update_status(matching, |s| handle.fire_transition(s));
  }

  pub(crate) fn dispatch_result(&self, status: GoalStatus, result: A::Result) {
    if !self.is_active() || status.goal_id != *self.goal_id() {
      return;
    }
    // A duplicate terminal result must not clobber the first one: only
    // record it if the CSM is not already Done. Store it before driving
    // the CSM to Done so a transition callback observing Done can read
    // result() and see it already populated.
    let already_done = self.inner.csm.is_done();
    if !already_done {
      *self.inner.latest_result.lock().unwrap() = Some(result);
    }
    let handle = self.clone();
    self.inner.csm.update_result(status, |s| handle.fire_transition(s));
  }

  pub(crate) fn dispatch_feedback(&self, status: &GoalStatus, feedback: A::Feedback) {
    if !self.is_active() || status.goal_id != *self.goal_id() {
      return;
    }
    if let Some(cb) = &mut self.inner.callbacks.lock().unwrap().on_feedback {
      cb(self, feedback);
    }
  }

  fn fire_transition(&self, state: CommState) {
    // Re-check activeness: a callback earlier in this same batch may have
    // shut this handle down.
    if !self.is_active() {
      return;
    }
    if let Some(cb) = &mut self.inner.callbacks.lock().unwrap().on_transition {
      cb(self, state);
    }
  }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex as StdMutex};

  use super::*;
  use crate::action_msgs::ServerStatus;

  struct Noop;
  impl ActionTypes for Noop {
    type Goal = ();
    type Feedback = ();
    type Result = i32;

    fn action_type_name() -> &'static str {
      "test/Noop"
    }
  }

  fn new_handle(id: &str) -> GoalHandle<Noop> {
    let action_goal = Noop::new_action_goal((), Time::ZERO, GoalId::new(id.to_owned(), Time::ZERO));
    GoalHandle::new(action_goal, std::sync::Weak::new())
  }

  fn status(id: &str, status: ServerStatus) -> GoalStatus {
    GoalStatus { goal_id: GoalId::new(id.to_owned(), Time::ZERO), status, text: String::new() }
  }

  #[test]
  fn cancel_immediately_enters_waiting_for_cancel_ack_s2() {
    let handle = new_handle("g2");
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let seen2 = seen.clone();
    handle.set_callbacks(Callbacks {
      on_transition: Some(Box::new(move |_h, s| seen2.lock().unwrap().push(s))),
      on_feedback: None,
    });

    handle.cancel();
    assert_eq!(handle.comm_state(), CommState::WaitingForCancelAck);
    assert_eq!(*seen.lock().unwrap(), vec![CommState::WaitingForCancelAck]);

    handle.dispatch_status(Some(&status("g2", ServerStatus::Recalling)));
    assert_eq!(handle.comm_state(), CommState::Recalling);

    handle.dispatch_result(status("g2", ServerStatus::Recalled), 0);
    assert_eq!(handle.comm_state(), CommState::Done);
    assert_eq!(handle.terminal_state(), TerminalState::Recalled);
  }

  #[test]
  fn mismatched_goal_id_is_ignored_s4() {
    let handle = new_handle("g4");
    let fired = Arc::new(StdMutex::new(false));
    let fired2 = fired.clone();
    handle.set_callbacks(Callbacks {
      on_transition: Some(Box::new(move |_h, _s| *fired2.lock().unwrap() = true)),
      on_feedback: None,
    });

    // A status array containing only an unrelated goal: the manager would
    // pass `None` here, since `find` on the array finds nothing for us.
    handle.dispatch_status(None);
    assert!(!*fired.lock().unwrap());
    assert_eq!(handle.comm_state(), CommState::WaitingForGoalAck);

    // A result for a different goal id must not be applied either.
    handle.dispatch_result(status("other", ServerStatus::Succeeded), 7);
    assert!(!*fired.lock().unwrap());
    assert_eq!(handle.comm_state(), CommState::WaitingForGoalAck);
    assert_eq!(handle.result(), None);
  }

  #[test]
  fn shutdown_is_idempotent() {
    let handle = new_handle("g8");
    handle.shutdown(false);
    assert_eq!(handle.comm_state(), CommState::Done); // inactive reads as Done
    handle.shutdown(false); // second call is a no-op, not a panic
    assert_eq!(handle.comm_state(), CommState::Done);
  }

  #[test]
  fn inactive_handle_reports_safe_defaults() {
    let handle = new_handle("g9");
    handle.shutdown(false);
    assert_eq!(handle.terminal_state(), TerminalState::Lost);
    assert_eq!(handle.result(), None);

    // Further status/result delivery after shutdown must not resurrect it.
    handle.dispatch_status(Some(&status("g9", ServerStatus::Active)));
    assert_eq!(handle.comm_state(), CommState::Done);
  }
}
