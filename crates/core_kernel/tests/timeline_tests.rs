//! Timeline audit-chain tests

use core_kernel::{Actor, ActorRole, Timeline, TimelineEvent};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Step {
    A,
    B,
    C,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![Just(Step::A), Just(Step::B), Just(Step::C)]
}

#[test]
fn timeline_records_actor_details() {
    let actor = Actor::admin("adm-7", "Lucia");
    let timeline = Timeline::start(TimelineEvent::initial(Step::A, actor.clone(), "created"))
        .unwrap();

    assert_eq!(timeline.last().actor, actor);
    assert_eq!(timeline.last().actor.role, ActorRole::Admin);
}

#[test]
fn system_actor_has_system_role() {
    assert_eq!(Actor::system().role, ActorRole::System);
}

proptest! {
    /// Appending any sequence of chained transitions keeps the whole
    /// history chained and strictly growing.
    #[test]
    fn chained_appends_preserve_the_audit_invariant(steps in prop::collection::vec(step_strategy(), 1..20)) {
        let mut timeline =
            Timeline::start(TimelineEvent::initial(Step::A, Actor::system(), "created")).unwrap();

        for (i, step) in steps.iter().enumerate() {
            let before = timeline.len();
            let current = timeline.current_status();
            timeline
                .record(TimelineEvent::transition(current, *step, Actor::system(), format!("step {i}")))
                .unwrap();
            prop_assert_eq!(timeline.len(), before + 1);
        }

        prop_assert!(timeline.is_chained());
        prop_assert_eq!(timeline.current_status(), *steps.last().unwrap());
    }

    /// An event whose previous status does not match the current status is
    /// rejected and the history is left untouched.
    #[test]
    fn unchained_appends_are_rejected(from in step_strategy(), to in step_strategy()) {
        let mut timeline =
            Timeline::start(TimelineEvent::initial(Step::A, Actor::system(), "created")).unwrap();
        let snapshot = timeline.clone();

        let event = TimelineEvent::transition(from, to, Actor::system(), "race");
        let result = timeline.record(event);

        if from == Step::A {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(timeline, snapshot);
        }
    }
}
