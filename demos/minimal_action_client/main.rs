use ros2_action_client::{
  action::{ActionClientQosPolicies, ActionTypes, CommState},
  ros2::{self, policy},
  ActionTypeName, Context, Message, NodeName, NodeOptions,
};
use serde::{Deserialize, Serialize};

// A toy action: count up to `goal` in steps of one second, reporting the
// running count as feedback, and the final count as the result.
struct CountUp;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CountUpGoal {
  target: i32,
}
impl Message for CountUpGoal {}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CountUpFeedback {
  current: i32,
}
impl Message for CountUpFeedback {}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CountUpResult {
  final_count: i32,
}
impl Message for CountUpResult {}

impl ActionTypes for CountUp {
  type Goal = CountUpGoal;
  type Feedback = CountUpFeedback;
  type Result = CountUpResult;

  fn action_type_name() -> &'static str {
    "demo_actions/CountUp"
  }
}

fn main() {
  log4rs::init_file("demos/minimal_action_client/log4rs.yaml", Default::default()).unwrap();

  let context = Context::new().unwrap();
  let mut node = context
    .new_node(
      NodeName::new("/rustdds", "count_up_client").unwrap(),
      NodeOptions::new(),
    )
    .unwrap();

  let qos = ros2::QosPolicyBuilder::new()
    .history(policy::History::KeepLast { depth: 10 })
    .reliability(policy::Reliability::Reliable {
      max_blocking_time: ros2::Duration::from_millis(100),
    })
    .build();
  let action_qos = ActionClientQosPolicies {
    goal: qos.clone(),
    cancel: qos.clone(),
    status: qos.clone(),
    feedback: qos.clone(),
    result: qos,
  };

  let manager = node
    .create_action_client::<CountUp>(
      "/count_up",
      &ActionTypeName::new("demo_actions", "CountUp"),
      action_qos,
    )
    .unwrap();

  let handle = manager.submit(CountUpGoal { target: 5 });
  handle.set_callbacks(ros2_action_client::action::Callbacks {
    on_transition: Some(Box::new(|h, state| {
      println!("goal {} -> {:?}", h.goal_id().id, state);
      if state == CommState::Done {
        println!("final result: {:?}", h.result().map(|r| r.final_count));
      }
    })),
    on_feedback: Some(Box::new(|_h, fb| println!("feedback: current={}", fb.current))),
  });

  // Drive the manager's subscriptions; an async/smol executor would
  // normally schedule this instead of a bare loop.
  loop {
    manager.poll_once();
    std::thread::sleep(std::time::Duration::from_millis(100));
    if handle.comm_state() == CommState::Done {
      break;
    }
  }
}
