//! The Communication State Machine: one per live goal. This is the core
//! of the action protocol. It translates the server's advertised status
//! into a client-side view with strict legality rules, firing callbacks
//! on every observed transition.

use std::sync::Mutex;

use log::error;

use crate::action_msgs::{GoalStatus, ServerStatus};

/// Client-side view of a goal's progress through the protocol.
///
/// Initial state of any new CSM is [`CommState::WaitingForGoalAck`].
/// [`CommState::Done`] is terminal: once entered it never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommState {
  WaitingForGoalAck,
  Pending,
  Active,
  WaitingForResult,
  WaitingForCancelAck,
  Recalling,
  Preempting,
  Done,
}

/// The outcome of a goal once its CSM has reached [`CommState::Done`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalState {
  Recalled,
  Rejected,
  Preempted,
  Succeeded,
  Aborted,
  Lost,
}

impl TerminalState {
  fn from_status(status: ServerStatus) -> Option<Self> {
    match status {
      ServerStatus::Preempted => Some(TerminalState::Preempted),
      ServerStatus::Succeeded => Some(TerminalState::Succeeded),
      ServerStatus::Aborted => Some(TerminalState::Aborted),
      ServerStatus::Rejected => Some(TerminalState::Rejected),
      ServerStatus::Recalled => Some(TerminalState::Recalled),
      ServerStatus::Lost => Some(TerminalState::Lost),
      ServerStatus::Pending | ServerStatus::Active | ServerStatus::Preempting | ServerStatus::Recalling => None,
    }
  }
}

/// One cell of the transition table: either the goal stays put, the
/// observed status is illegal for the current state, or it enters the
/// given sequence of states in order.
enum Transition {
  None,
  Illegal,
  Enter(&'static [CommState]),
}

use CommState::*;

/// The transition table: for every (current state, incoming server
/// status) pair, the ordered sequence of states the CSM enters. Anything
/// not covered here is either a same-state no-op or illegal.
fn table(from: CommState, status: ServerStatus) -> Transition {
  use ServerStatus as S;
  use Transition::*;
  match (from, status) {
    // WAITING_FOR_GOAL_ACK
    (WaitingForGoalAck, S::Pending) => Enter(&[Pending]),
    (WaitingForGoalAck, S::Active) => Enter(&[Active]),
    (WaitingForGoalAck, S::Preempted) => Enter(&[Active, Preempting, WaitingForResult]),
    (WaitingForGoalAck, S::Succeeded) => Enter(&[Active, WaitingForResult]),
    (WaitingForGoalAck, S::Aborted) => Enter(&[Active, WaitingForResult]),
    (WaitingForGoalAck, S::Rejected) => Enter(&[Pending, WaitingForResult]),
    (WaitingForGoalAck, S::Preempting) => Enter(&[Active, Preempting]),
    (WaitingForGoalAck, S::Recalling) => Enter(&[Pending, Recalling]),
    (WaitingForGoalAck, S::Recalled) => Enter(&[Pending, WaitingForResult]),

    // PENDING
    (Pending, S::Pending) => None,
    (Pending, S::Active) => Enter(&[Active]),
    (Pending, S::Preempted) => Enter(&[Active, Preempting, WaitingForResult]),
    (Pending, S::Succeeded) => Enter(&[Active, WaitingForResult]),
    (Pending, S::Aborted) => Enter(&[Active, WaitingForResult]),
    (Pending, S::Rejected) => Enter(&[WaitingForResult]),
    (Pending, S::Preempting) => Enter(&[Active, Preempting]),
    (Pending, S::Recalling) => Enter(&[Recalling]),
    (Pending, S::Recalled) => Enter(&[Recalling, WaitingForResult]),

    // ACTIVE
    (Active, S::Pending) => Illegal,
    (Active, S::Active) => None,
    (Active, S::Preempted) => Enter(&[Preempting, WaitingForResult]),
    (Active, S::Succeeded) => Enter(&[WaitingForResult]),
    (Active, S::Aborted) => Enter(&[WaitingForResult]),
    (Active, S::Rejected) => Illegal,
    (Active, S::Preempting) => Enter(&[Preempting]),
    (Active, S::Recalling) => Illegal,
    (Active, S::Recalled) => Illegal,

    // WAITING_FOR_RESULT
    (WaitingForResult, S::Pending) => Illegal,
    (WaitingForResult, S::Active) => None,
    (WaitingForResult, S::Preempted) => None,
    (WaitingForResult, S::Succeeded) => None,
    (WaitingForResult, S::Aborted) => None,
    (WaitingForResult, S::Rejected) => None,
    (WaitingForResult, S::Preempting) => Illegal,
    (WaitingForResult, S::Recalling) => Illegal,
    (WaitingForResult, S::Recalled) => None,

    // WAITING_FOR_CANCEL_ACK
    (WaitingForCancelAck, S::Pending) => None,
    (WaitingForCancelAck, S::Active) => None,
    (WaitingForCancelAck, S::Preempted) => Enter(&[Preempting, WaitingForResult]),
    (WaitingForCancelAck, S::Succeeded) => Enter(&[Preempting, WaitingForResult]),
    (WaitingForCancelAck, S::Aborted) => Enter(&[Preempting, WaitingForResult]),
    (WaitingForCancelAck, S::Rejected) => Enter(&[WaitingForResult]),
    (WaitingForCancelAck, S::Preempting) => Enter(&[Preempting]),
    (WaitingForCancelAck, S::Recalling) => Enter(&[Recalling]),
    (WaitingForCancelAck, S::Recalled) => Enter(&[Recalling, WaitingForResult]),

    // RECALLING
    (Recalling, S::Pending) => Illegal,
    (Recalling, S::Active) => Illegal,
    (Recalling, S::Preempted) => Enter(&[Preempting, WaitingForResult]),
    (Recalling, S::Succeeded) => Enter(&[Preempting, WaitingForResult]),
    (Recalling, S::Aborted) => Enter(&[Preempting, WaitingForResult]),
    (Recalling, S::Rejected) => Enter(&[WaitingForResult]),
    (Recalling, S::Preempting) => Enter(&[Preempting]),
    (Recalling, S::Recalling) => None,
    (Recalling, S::Recalled) => Enter(&[WaitingForResult]),

    // PREEMPTING
    (Preempting, S::Pending) => Illegal,
    (Preempting, S::Active) => Illegal,
    (Preempting, S::Preempted) => Enter(&[WaitingForResult]),
    (Preempting, S::Succeeded) => Enter(&[WaitingForResult]),
    (Preempting, S::Aborted) => Enter(&[WaitingForResult]),
    (Preempting, S::Rejected) => Illegal,
    (Preempting, S::Preempting) => None,
    (Preempting, S::Recalling) => Illegal,
    (Preempting, S::Recalled) => Illegal,

    // DONE
    (Done, S::Pending) => Illegal,
    (Done, S::Active) => None,
    (Done, S::Preempted) => None,
    (Done, S::Succeeded) => None,
    (Done, S::Aborted) => None,
    (Done, S::Rejected) => None,
    (Done, S::Preempting) => Illegal,
    (Done, S::Recalling) => Illegal,
    (Done, S::Recalled) => None,

    // LOST never appears as a table column: it only arrives synthesized
    // by update_status itself, which transitions straight to DONE without
    // consulting this table.
    (_, S::Lost) => None,
  }
}

/// Mutable state protected by a per-goal mutex.
pub(super) struct CsmState {
  pub(super) comm_state: CommState,
  pub(super) latest_status: Option<GoalStatus>,
}

/// The Communication State Machine for one live goal.
///
/// All mutating and reading operations acquire `state` for their entire
/// duration; user callbacks fire while the lock is held, so they must not
/// re-enter operations on this same CSM.
pub struct Csm {
  state: Mutex<CsmState>,
}

impl Csm {
  pub fn new() -> Self {
    Csm {
      state: Mutex::new(CsmState { comm_state: WaitingForGoalAck, latest_status: None }),
    }
  }

  pub fn comm_state(&self) -> CommState {
    self.state.lock().unwrap().comm_state
  }

  pub fn latest_status(&self) -> Option<GoalStatus> {
    self.state.lock().unwrap().latest_status.clone()
  }

  pub fn terminal_state(&self) -> TerminalState {
    let g = self.state.lock().unwrap();
    match &g.latest_status {
      Some(gs) => match TerminalState::from_status(gs.status) {
        Some(t) => t,
        None => {
          error!(
            "terminal_state() queried with non-terminal latest status {:?}; CSM state is {:?}",
            gs.status, g.comm_state
          );
          TerminalState::Lost
        }
      },
      None => {
        error!("terminal_state() queried with no status ever received");
        TerminalState::Lost
      }
    }
  }

  /// Run the ordered sequence of states dictated by the table, firing
  /// `on_transition` once per entered state, synchronously, while the
  /// lock is held.
  fn run_sequence(
    g: &mut std::sync::MutexGuard<CsmState>,
    seq: &[CommState],
    mut on_transition: impl FnMut(CommState),
  ) {
    for &s in seq {
      g.comm_state = s;
      on_transition(s);
    }
  }

  /// Dispatch one status array update.
  ///
  /// `matching` is the entry of the incoming array whose `goal_id`
  /// belongs to this CSM, already picked out by the caller (the
  /// [`Manager`](super::manager::GoalManager) knows every handle's id and
  /// does the lookup once per handle). `on_transition` fires once per
  /// entered state, in order, with the lock held.
  pub fn update_status(
    &self,
    matching: Option<&GoalStatus>,
    mut on_transition: impl FnMut(CommState),
  ) {
    let mut g = self.state.lock().unwrap();

    let Some(s) = matching else {
      match g.comm_state {
        WaitingForGoalAck | WaitingForResult | Done => return,
        _ => {
          if let Some(status) = &mut g.latest_status {
            status.status = ServerStatus::Lost;
          } else {
            // No prior status at all; synthesize a bare one so
            // terminal_state() has something to report.
            g.latest_status = Some(GoalStatus {
              goal_id: crate::action_msgs::GoalId::ZERO,
              status: ServerStatus::Lost,
              text: String::new(),
            });
          }
          g.comm_state = Done;
          on_transition(Done);
          return;
        }
      }
    };

    if g.comm_state == Done {
      return; // late update, ignored
    }

    g.latest_status = Some(s.clone());

    match table(g.comm_state, s.status) {
      Transition::None => {}
      Transition::Illegal => {
        error!(
          "illegal transition: status {:?} received while in state {:?}",
          s.status, g.comm_state
        );
      }
      Transition::Enter(seq) => Self::run_sequence(&mut g, seq, &mut on_transition),
    }
  }

  /// A result always refreshes `latest_status` then lands on DONE directly,
  /// without re-running the transition table.
  pub fn update_result(
    &self,
    status: GoalStatus,
    mut on_transition: impl FnMut(CommState),
  ) {
    let mut g = self.state.lock().unwrap();

    if g.comm_state == Done {
      error!("update_result on goal already DONE (duplicate terminal, status {:?})", status.status);
      return;
    }

    g.latest_status = Some(status);
    g.comm_state = Done;
    on_transition(Done);
  }

  /// Explicit, single-state transition used by
  /// user-initiated cancel.
  pub fn transition_to(&self, new_state: CommState, mut on_transition: impl FnMut(CommState)) {
    let mut g = self.state.lock().unwrap();
    g.comm_state = new_state;
    on_transition(new_state);
  }

  /// Whether feeding `status` while in `DONE` would be rejected as a
  /// late update (used by the Manager to decide whether it still needs
  /// to dispatch feedback too).
  pub fn is_done(&self) -> bool {
    self.state.lock().unwrap().comm_state == Done
  }
}

impl Default for Csm {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::action_msgs::GoalId;

  fn status(id: &str, status: ServerStatus) -> GoalStatus {
    GoalStatus { goal_id: GoalId::new(id.to_owned(), crate::builtin_interfaces::Time::ZERO), status, text: String::new() }
  }

  #[test]
  fn happy_path_s1() {
    let csm = Csm::new();
    let mut seen = Vec::new();
    csm.update_status(Some(&status("g1", ServerStatus::Pending)), |s| seen.push(s));
    csm.update_status(Some(&status("g1", ServerStatus::Active)), |s| seen.push(s));
    csm.update_status(Some(&status("g1", ServerStatus::Succeeded)), |s| seen.push(s));
    csm.update_result(status("g1", ServerStatus::Succeeded), |s| seen.push(s));

    assert_eq!(seen, vec![Pending, Active, WaitingForResult, Done]);
    assert_eq!(csm.comm_state(), Done);
    assert_eq!(csm.terminal_state(), TerminalState::Succeeded);
  }

  #[test]
  fn missing_status_synthesizes_lost_s3() {
    let csm = Csm::new();
    csm.update_status(Some(&status("g3", ServerStatus::Active)), |_| {});
    assert_eq!(csm.comm_state(), Active);

    let mut seen = Vec::new();
    csm.update_status(None, |s| seen.push(s));
    assert_eq!(seen, vec![Done]);
    assert_eq!(csm.terminal_state(), TerminalState::Lost);
  }

  #[test]
  fn server_skips_active_s6() {
    let csm = Csm::new();
    let mut seen = Vec::new();
    csm.update_status(Some(&status("g6", ServerStatus::Preempted)), |s| seen.push(s));
    assert_eq!(seen, vec![Active, Preempting, WaitingForResult]);

    let mut seen2 = Vec::new();
    csm.update_result(status("g6", ServerStatus::Preempted), |s| seen2.push(s));
    assert_eq!(seen2, vec![Done]);
    assert_eq!(csm.terminal_state(), TerminalState::Preempted);
  }

  #[test]
  fn duplicate_terminal_is_rejected_s5() {
    let csm = Csm::new();
    csm.update_status(Some(&status("g5", ServerStatus::Succeeded)), |_| {});
    csm.update_result(status("g5", ServerStatus::Succeeded), |_| {});
    assert_eq!(csm.comm_state(), Done);

    let mut seen = Vec::new();
    csm.update_result(status("g5", ServerStatus::Aborted), |s| seen.push(s));
    assert!(seen.is_empty());
    assert_eq!(csm.terminal_state(), TerminalState::Succeeded);
  }

  #[test]
  fn illegal_transition_leaves_state_unchanged() {
    let csm = Csm::new();
    let mut seen = Vec::new();
    csm.update_status(Some(&status("g", ServerStatus::Active)), |s| seen.push(s));
    csm.update_status(Some(&status("g", ServerStatus::Pending)), |s| seen.push(s));
    assert_eq!(seen, vec![Active]); // the illegal Active->Pending produced no further transition
    assert_eq!(csm.comm_state(), Active);
  }
}
