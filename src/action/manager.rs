//! Owns the set of live goal handles for one client: forwards every
//! incoming status/feedback/result message to the handles it knows
//! about, and publishes outgoing goal/cancel messages on their behalf.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

#[allow(unused_imports)]
use log::{debug, error, info, warn};
use rustdds::{dds::CreateResult, QosPolicies};

use crate::{
  action::{
    goal_id::GoalIdGenerator,
    handle::GoalHandle,
    spec::{ActionFeedback, ActionGoal, ActionResult, ActionTypes},
  },
  action_msgs::{GoalId, GoalStatusArray},
  builtin_interfaces::Time,
  names::{ActionTypeName, MessageTypeName, Name},
  node::Node,
  pubsub::{Publisher, Subscription},
};

/// QoS for the five topics an action client uses. Goal and cancel are
/// published; status, feedback and result are subscribed to.
pub struct ActionClientQosPolicies {
  pub goal: QosPolicies,
  pub cancel: QosPolicies,
  pub status: QosPolicies,
  pub feedback: QosPolicies,
  pub result: QosPolicies,
}

pub(crate) struct ManagerInner<A: ActionTypes> {
  action_name: String,
  goal_publisher: Publisher<ActionGoal<A::Goal>>,
  cancel_publisher: Publisher<GoalId>,
  status_subscription: Mutex<Subscription<GoalStatusArray>>,
  feedback_subscription: Mutex<Subscription<ActionFeedback<A::Feedback>>>,
  result_subscription: Mutex<Subscription<ActionResult<A::Result>>>,
  goal_id_generator: GoalIdGenerator,
  handles: Mutex<HashMap<String, GoalHandle<A>>>,
}

impl<A: ActionTypes> ManagerInner<A> {
  pub(crate) fn publish_goal(&self, action_goal: &ActionGoal<A::Goal>) {
    if let Err(e) = self.goal_publisher.publish(action_goal.clone()) {
      error!("failed to publish goal on action '{}': {:?}", self.action_name, e);
    }
  }

  pub(crate) fn publish_cancel(&self, cancel_id: &GoalId) {
    if let Err(e) = self.cancel_publisher.publish(cancel_id.clone()) {
      error!("failed to publish cancel on action '{}': {:?}", self.action_name, e);
    }
  }

  pub(crate) fn forget(&self, goal_id: &GoalId) {
    self.handles.lock().unwrap().remove(&goal_id.id);
  }
}

/// The client side of one action: owns its goal handles, its topics, and
/// the generator used to stamp ids onto goals submitted without one.
pub struct GoalManager<A: ActionTypes> {
  inner: Arc<ManagerInner<A>>,
}

impl<A: ActionTypes> Clone for GoalManager<A> {
  fn clone(&self) -> Self {
    GoalManager { inner: self.inner.clone() }
  }
}

impl<A: ActionTypes> GoalManager<A> {
  pub(crate) fn new(
    node: &mut Node,
    action_name: &str,
    action_type_name: &ActionTypeName,
    qos: ActionClientQosPolicies,
  ) -> CreateResult<Self>
  where
    A: 'static,
  {
    if let Err(e) = A::is_valid() {
      error!("action specification for '{}' is invalid: {}", action_name, e);
      return rustdds::create_error_bad_parameter!("invalid action specification");
    }

    // ROS 2 actions place their five topics under a shared `_action`
    // namespace segment, e.g. `/count_up/_action/goal`, so that a plain
    // topic listing doesn't confuse them with ordinary topics of the same
    // action name.
    let action_ns = format!("{action_name}/_action");

    let goal_topic = node.create_topic(
      &Name::new(&action_ns, "goal")?,
      action_type_name.dds_action_topic("Goal").dds_msg_type(),
      &qos.goal,
    )?;
    let goal_publisher = node.create_publisher(&goal_topic, Some(qos.goal))?;

    let cancel_topic = node.create_topic(
      &Name::new(&action_ns, "cancel")?,
      MessageTypeName::new("actionlib_msgs", "GoalID").dds_msg_type(),
      &qos.cancel,
    )?;
    let cancel_publisher = node.create_publisher(&cancel_topic, Some(qos.cancel))?;

    let status_topic = node.create_topic(
      &Name::new(&action_ns, "status")?,
      MessageTypeName::new("actionlib_msgs", "GoalStatusArray").dds_msg_type(),
      &qos.status,
    )?;
    let status_subscription = node.create_subscription(&status_topic, Some(qos.status))?;

    let feedback_topic = node.create_topic(
      &Name::new(&action_ns, "feedback")?,
      action_type_name.dds_action_topic("Feedback").dds_msg_type(),
      &qos.feedback,
    )?;
    let feedback_subscription = node.create_subscription(&feedback_topic, Some(qos.feedback))?;

    let result_topic = node.create_topic(
      &Name::new(&action_ns, "result")?,
      action_type_name.dds_action_topic("Result").dds_msg_type(),
      &qos.result,
    )?;
    let result_subscription = node.create_subscription(&result_topic, Some(qos.result))?;

    Ok(GoalManager {
      inner: Arc::new(ManagerInner {
        action_name: action_name.to_owned(),
        goal_publisher,
        cancel_publisher,
        status_subscription: Mutex::new(status_subscription),
        feedback_subscription: Mutex::new(feedback_subscription),
        result_subscription: Mutex::new(result_subscription),
        goal_id_generator: GoalIdGenerator::new(action_name),
        handles: Mutex::new(HashMap::new()),
      }),
    })
  }

  /// Submit a goal. If it carries no id, one is generated from the
  /// current time; if its stamp is zero, it is stamped with now.
  pub fn submit(&self, goal: A::Goal) -> GoalHandle<A> {
    let now = Time::now();
    let goal_id = self.inner.goal_id_generator.next(now);
    let action_goal = A::new_action_goal(goal, now, goal_id.clone());
    self.inner.publish_goal(&action_goal);

    let handle = GoalHandle::new(action_goal, Arc::downgrade(&self.inner));
    self.inner.handles.lock().unwrap().insert(goal_id.id, handle.clone());
    handle
  }

  /// Dispatch a status array to every live handle. Order follows
  /// whatever order the transport delivered the array in; dispatch to
  /// each handle is independent of the others.
  pub fn on_status(&self, array: GoalStatusArray) {
    for handle in self.inner.handles.lock().unwrap().values() {
      let matching = array.find(handle.goal_id()).cloned();
      handle.dispatch_status(matching.as_ref());
    }
  }

  /// Dispatch one feedback message to every live handle; only the one
  /// whose id matches reacts.
  pub fn on_feedback(&self, msg: ActionFeedback<A::Feedback>) {
    for handle in self.inner.handles.lock().unwrap().values() {
      handle.dispatch_feedback(&msg.status, msg.feedback.clone());
    }
  }

  /// Dispatch one result message to every live handle; only the one
  /// whose id matches reacts.
  pub fn on_result(&self, msg: ActionResult<A::Result>) {
    for handle in self.inner.handles.lock().unwrap().values() {
      handle.dispatch_result(msg.status.clone(), msg.result.clone());
    }
  }

  /// Publish a cancel message bearing `goal_id`. An empty id cancels
  /// every goal.
  pub fn send_cancel(&self, goal_id: &GoalId) {
    self.inner.publish_cancel(goal_id);
  }

  /// Stop tracking a handle without deactivating it. Normally reached
  /// through [`GoalHandle::shutdown`] rather than called directly.
  pub fn delete_handle(&self, handle: &GoalHandle<A>) {
    self.inner.forget(handle.goal_id());
  }

  /// Drain and dispatch everything currently buffered on the status,
  /// feedback and result subscriptions. Non-blocking: returns as soon as
  /// each subscription reports no further samples.
  pub fn poll_once(&self) {
    loop {
      let sample = self.inner.status_subscription.lock().unwrap().take();
      match sample {
        Ok(Some((array, _info))) => self.on_status(array),
        Ok(None) => break,
        Err(e) => {
          error!("error reading status on action '{}': {:?}", self.inner.action_name, e);
          break;
        }
      }
    }
    loop {
      let sample = self.inner.feedback_subscription.lock().unwrap().take();
      match sample {
        Ok(Some((fb, _info))) => self.on_feedback(fb),
        Ok(None) => break,
        Err(e) => {
          error!("error reading feedback on action '{}': {:?}", self.inner.action_name, e);
          break;
        }
      }
    }
    loop {
      let sample = self.inner.result_subscription.lock().unwrap().take();
      match sample {
        Ok(Some((res, _info))) => self.on_result(res),
        Ok(None) => break,
        Err(e) => {
          error!("error reading result on action '{}': {:?}", self.inner.action_name, e);
          break;
        }
      }
    }
  }
}
