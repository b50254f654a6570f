//! End-to-end behaviour of nested state machines.

use lineage::trace::{TraceEvent, TraceLog};
use lineage::{
    event_enum, state_enum, BuildError, Checkpoint, CheckpointError, Definition,
    DefinitionBuilder, HsmError, Machine, MachineConfig, Outcome, State,
};
use std::sync::Arc;

// The classic nested-state fixture: S, S1, S11, S2, S21, S211.

state_enum! {
    enum Fx { Root, S, S1, S11, S2, S21, S211 }
    root: Root
}

event_enum! {
    enum Sig { A, B, C, D, E, F, G, H, I }
}

#[derive(Debug, Default)]
struct Fixture {
    foo: bool,
    log: Vec<String>,
}

fn fixture() -> Arc<Definition<Fx, Sig, Fixture>> {
    DefinitionBuilder::new("qhsm")
        .states([
            (Fx::S, Fx::Root),
            (Fx::S1, Fx::S),
            (Fx::S11, Fx::S1),
            (Fx::S2, Fx::S),
            (Fx::S21, Fx::S2),
            (Fx::S211, Fx::S21),
        ])
        .on_any_entry(|s: &Fx, fx: &mut Fixture| fx.log.push(format!("enter {}", s.name())))
        .on_any_exit(|s: &Fx, fx: &mut Fixture| fx.log.push(format!("exit {}", s.name())))
        .initial_transition(Fx::Root, Fx::S)
        .initial_transition(Fx::S, Fx::S11)
        .initial_transition(Fx::S1, Fx::S11)
        .initial_transition(Fx::S2, Fx::S211)
        .initial_transition(Fx::S21, Fx::S211)
        // S
        .on_event(Fx::S, Sig::E, |m, _| m.transition(Fx::S11))
        .on_event(Fx::S, Sig::I, |m, _| {
            if m.context().foo {
                m.context_mut().foo = false;
                Ok(Outcome::Handled)
            } else {
                Ok(Outcome::NotHandled)
            }
        })
        // S1
        .on_event(Fx::S1, Sig::A, |m, _| m.transition(Fx::S1))
        .on_event(Fx::S1, Sig::B, |m, _| m.transition(Fx::S11))
        .on_event(Fx::S1, Sig::C, |m, _| m.transition(Fx::S2))
        .on_event(Fx::S1, Sig::D, |m, _| {
            if m.context().foo {
                return Ok(Outcome::NotHandled);
            }
            m.transition_with(Fx::S, |fx: &mut Fixture| fx.foo = true)
        })
        .on_event(Fx::S1, Sig::F, |m, _| m.transition(Fx::S211))
        .on_event(Fx::S1, Sig::I, |_, _| Ok(Outcome::Handled))
        // S11
        .on_event(Fx::S11, Sig::D, |m, _| {
            if !m.context().foo {
                return Ok(Outcome::NotHandled);
            }
            m.transition_with(Fx::S1, |fx: &mut Fixture| fx.foo = false)
        })
        .on_event(Fx::S11, Sig::G, |m, _| m.transition(Fx::S211))
        .on_event(Fx::S11, Sig::H, |m, _| m.transition(Fx::S))
        // S2
        .on_event(Fx::S2, Sig::C, |m, _| m.transition(Fx::S1))
        .on_event(Fx::S2, Sig::F, |m, _| m.transition(Fx::S11))
        .on_event(Fx::S2, Sig::I, |m, _| {
            if m.context().foo {
                return Ok(Outcome::NotHandled);
            }
            m.context_mut().foo = true;
            Ok(Outcome::Handled)
        })
        // S21
        .on_event(Fx::S21, Sig::A, |m, _| m.transition(Fx::S21))
        .on_event(Fx::S21, Sig::B, |m, _| m.transition(Fx::S211))
        .on_event(Fx::S21, Sig::G, |m, _| m.transition(Fx::S1))
        // S211
        .on_event(Fx::S211, Sig::D, |m, _| m.transition(Fx::S21))
        .on_event(Fx::S211, Sig::H, |m, _| m.transition(Fx::S))
        .build()
        .unwrap()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn fixture_initializes_into_s11() {
    let machine = Machine::new(fixture(), Fixture::default()).unwrap();

    assert_eq!(machine.current(), Fx::S11);
    assert_eq!(
        machine.context().log,
        strings(&["enter S", "enter S1", "enter S11"])
    );
}

#[test]
fn fixture_event_table_is_reproduced() {
    let mut machine = Machine::new(fixture(), Fixture::default()).unwrap();

    // (event, resting state, foo, exits and entries)
    let table: Vec<(Sig, Fx, bool, Vec<String>)> = vec![
        (
            Sig::A,
            Fx::S11,
            false,
            strings(&["exit S11", "exit S1", "enter S1", "enter S11"]),
        ),
        (Sig::B, Fx::S11, false, strings(&["exit S11", "enter S11"])),
        (
            Sig::D,
            Fx::S11,
            true,
            strings(&["exit S11", "exit S1", "enter S1", "enter S11"]),
        ),
        (
            Sig::E,
            Fx::S11,
            true,
            strings(&["exit S11", "exit S1", "enter S1", "enter S11"]),
        ),
        (Sig::I, Fx::S11, true, Vec::new()),
        (
            Sig::F,
            Fx::S211,
            true,
            strings(&["exit S11", "exit S1", "enter S2", "enter S21", "enter S211"]),
        ),
        (Sig::I, Fx::S211, false, Vec::new()),
        (Sig::I, Fx::S211, true, Vec::new()),
        (
            Sig::F,
            Fx::S11,
            true,
            strings(&[
                "exit S211",
                "exit S21",
                "exit S2",
                "enter S1",
                "enter S11",
            ]),
        ),
    ];

    for (event, state, foo, log) in table {
        machine.context_mut().log.clear();
        assert_eq!(machine.send(event).unwrap(), Outcome::Handled, "{:?}", event);
        assert_eq!(machine.current(), state, "after {:?}", event);
        assert_eq!(machine.context().foo, foo, "foo after {:?}", event);
        assert_eq!(machine.context().log, log, "callbacks for {:?}", event);
    }

    assert_eq!(machine.current(), Fx::S11);
    assert_eq!(machine.last_event(), Some(Sig::F));
}

#[test]
fn fixture_d_in_s11_returns_to_s1_when_foo_is_set() {
    let mut machine = Machine::new(fixture(), Fixture::default()).unwrap();
    machine.send(Sig::D).unwrap();
    assert!(machine.context().foo);

    machine.context_mut().log.clear();
    machine.send(Sig::D).unwrap();

    assert!(!machine.context().foo);
    assert_eq!(machine.current(), Fx::S11);
    assert_eq!(
        machine.context().log,
        strings(&["exit S11", "enter S11"])
    );
}

#[test]
fn fixture_is_in_follows_active_configuration() {
    let mut machine = Machine::new(fixture(), Fixture::default()).unwrap();
    assert!(machine.is_in(&Fx::S1).unwrap());
    assert!(machine.is_in(&Fx::Root).unwrap());
    assert!(!machine.is_in(&Fx::S2).unwrap());

    machine.send(Sig::G).unwrap();
    assert_eq!(machine.current(), Fx::S211);
    assert!(machine.is_in(&Fx::S21).unwrap());
    assert!(!machine.is_in(&Fx::S1).unwrap());
}

// Exit and entry ordering across sibling branches.

state_enum! {
    enum Branch { Root, A, A1, B, B1 }
    root: Root
}

event_enum! {
    enum Cross { Go, Stay }
}

#[derive(Debug, Default)]
struct Order {
    exits: Vec<Branch>,
    actions: usize,
    entries: Vec<Branch>,
}

fn branches(tracer: Arc<TraceLog<Branch, Cross>>) -> Arc<Definition<Branch, Cross, Order>> {
    DefinitionBuilder::new("branches")
        .state(Branch::A, Branch::Root)
        .state(Branch::A1, Branch::A)
        .state(Branch::B, Branch::Root)
        .state(Branch::B1, Branch::B)
        .initial_transition(Branch::Root, Branch::A1)
        .on_any_exit(|s: &Branch, o: &mut Order| {
            assert!(o.entries.is_empty() && o.actions == 0);
            o.exits.push(*s)
        })
        .on_any_entry(|s: &Branch, o: &mut Order| o.entries.push(*s))
        .on_event(Branch::A1, Cross::Go, |m, _| {
            m.transition_with(Branch::B1, |o: &mut Order| {
                assert!(o.entries.is_empty());
                o.actions += 1
            })
        })
        .tracer(tracer)
        .build()
        .unwrap()
}

#[test]
fn exits_child_first_and_enters_parent_first() {
    let tracer = Arc::new(TraceLog::new());
    let mut machine = Machine::new(branches(tracer), Order::default()).unwrap();
    *machine.context_mut() = Order::default();

    machine.send(Cross::Go).unwrap();

    let order = machine.into_context();
    assert_eq!(order.exits, vec![Branch::A1, Branch::A]);
    assert_eq!(order.actions, 1);
    assert_eq!(order.entries, vec![Branch::B, Branch::B1]);
}

#[test]
fn tracer_sees_transition_phases_in_order() {
    let tracer = Arc::new(TraceLog::new());
    let mut machine = Machine::new(branches(Arc::clone(&tracer)), Order::default()).unwrap();
    *machine.context_mut() = Order::default();
    tracer.clear();

    machine.send(Cross::Go).unwrap();

    let (source, target) = (Branch::A1, Branch::B1);
    assert_eq!(
        tracer.take(),
        vec![
            TraceEvent::DispatchBegin {
                state: Branch::A1,
                event: Cross::Go
            },
            TraceEvent::TransitionBegin { source, target },
            TraceEvent::Exit(Branch::A1),
            TraceEvent::Exit(Branch::A),
            TraceEvent::ExitsDone { source, target },
            TraceEvent::ActionBegin { source, target },
            TraceEvent::ActionEnd { source, target },
            TraceEvent::EntriesBegin { source, target },
            TraceEvent::Entry(Branch::B),
            TraceEvent::Entry(Branch::B1),
            TraceEvent::Initial(Branch::B1),
            TraceEvent::TransitionEnd { source, target },
            TraceEvent::DispatchEnd {
                state: Branch::A1,
                event: Cross::Go,
                outcome: Outcome::Handled
            },
        ]
    );
}

#[test]
fn unclaimed_event_visits_every_ancestor_once_then_reports_not_handled() {
    let tracer = Arc::new(TraceLog::new());
    let mut machine = Machine::new(branches(Arc::clone(&tracer)), Order::default()).unwrap();
    tracer.clear();

    assert_eq!(machine.send(Cross::Stay).unwrap(), Outcome::NotHandled);

    let offered: Vec<Branch> = tracer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TraceEvent::DispatchBegin { state, .. } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(offered, vec![Branch::A1, Branch::A, Branch::Root]);
    assert_eq!(machine.current(), Branch::A1);
}

// Handler precedence, delegation and errors.

state_enum! {
    enum Unit { Root, Parent, Leaf }
    root: Root
}

event_enum! {
    enum Signal { Tick, Tock, Other }
}

type Calls = Vec<&'static str>;

fn unit_builder(name: &str) -> DefinitionBuilder<Unit, Signal, Calls> {
    DefinitionBuilder::new(name)
        .state(Unit::Parent, Unit::Root)
        .state(Unit::Leaf, Unit::Parent)
        .initial_transition(Unit::Root, Unit::Leaf)
}

#[test]
fn specific_handler_wins_over_any_event_fallback() {
    let definition = unit_builder("precedence")
        .on_event(Unit::Leaf, Signal::Tick, |m, _| {
            m.context_mut().push("specific");
            Ok(Outcome::Handled)
        })
        .on_any_event(Unit::Leaf, |m, _| {
            m.context_mut().push("fallback");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(definition, Vec::new()).unwrap();

    machine.send(Signal::Tick).unwrap();
    machine.send(Signal::Tock).unwrap();
    machine.send(Signal::Tick).unwrap();

    assert_eq!(machine.context(), &vec!["specific", "fallback", "specific"]);
}

#[test]
fn declined_fallback_lets_parent_handle() {
    let definition = unit_builder("fallback declines")
        .on_any_event(Unit::Leaf, |_, _| Ok(Outcome::NotHandled))
        .on_event(Unit::Parent, Signal::Tock, |m, _| {
            m.context_mut().push("parent");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(definition, Vec::new()).unwrap();

    assert_eq!(machine.send(Signal::Tock).unwrap(), Outcome::Handled);
    assert_eq!(machine.source(), Unit::Parent);
    assert_eq!(machine.context(), &vec!["parent"]);
}

fn unit_base() -> Arc<Definition<Unit, Signal, Calls>> {
    unit_builder("base")
        .on_event(Unit::Leaf, Signal::Tick, |m, _| {
            m.context_mut().push("base tick");
            Ok(Outcome::Handled)
        })
        .on_event(Unit::Leaf, Signal::Tock, |m, _| {
            m.context_mut().push("base tock");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap()
}

#[test]
fn derived_handler_delegates_to_base_explicitly() {
    let base = unit_base();
    let derived = DefinitionBuilder::extend("derived", &base)
        .on_event(Unit::Leaf, Signal::Tick, |m, payload| {
            let base = m.definition().base().cloned();
            if let Some(base) = base {
                base.handle_event(m, &Unit::Leaf, &Signal::Tick, payload)?;
            }
            m.context_mut().push("derived tick");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(derived, Vec::new()).unwrap();

    machine.send(Signal::Tick).unwrap();
    assert_eq!(machine.context(), &vec!["base tick", "derived tick"]);
}

#[test]
fn overriding_handler_does_not_chain_to_base() {
    let base = unit_base();
    let derived = DefinitionBuilder::extend("derived", &base)
        .on_event(Unit::Leaf, Signal::Tock, |m, _| {
            m.context_mut().push("derived tock");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(derived, Vec::new()).unwrap();

    machine.send(Signal::Tock).unwrap();
    machine.send(Signal::Tick).unwrap();
    assert_eq!(machine.context(), &vec!["derived tock", "base tick"]);
}

#[test]
fn delegation_resolves_in_immediate_base_only() {
    let base = unit_base();
    let middle = DefinitionBuilder::extend("middle", &base)
        .on_event(Unit::Leaf, Signal::Other, |m, _| {
            m.context_mut().push("middle other");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let leaf = DefinitionBuilder::extend("leaf", &middle)
        .on_event(Unit::Leaf, Signal::Other, |m, payload| {
            let base = m.definition().base().cloned();
            let outcome = match base {
                Some(base) => base.handle_event(m, &Unit::Leaf, &Signal::Other, payload)?,
                None => Outcome::NotHandled,
            };
            m.context_mut().push("leaf other");
            Ok(outcome)
        })
        .build()
        .unwrap();

    assert!(Arc::ptr_eq(leaf.base().unwrap(), &middle));
    assert!(base.handlers().event_for(&Unit::Leaf, &Signal::Other).is_none());

    let mut machine = Machine::new(leaf, Vec::new()).unwrap();
    assert_eq!(machine.send(Signal::Other).unwrap(), Outcome::Handled);
    assert_eq!(machine.context(), &vec!["middle other", "leaf other"]);
}

#[test]
fn handle_event_without_match_is_not_handled() {
    let base = unit_base();
    let mut machine = Machine::new(Arc::clone(&base), Vec::new()).unwrap();

    let outcome = base
        .handle_event(&mut machine, &Unit::Parent, &Signal::Other, &())
        .unwrap();
    assert_eq!(outcome, Outcome::NotHandled);
    assert!(machine.context().is_empty());
}

#[test]
fn root_declines_unclaimed_events() {
    let definition = unit_builder("plain").build().unwrap();
    let mut machine = Machine::new(definition, Vec::new()).unwrap();

    assert_eq!(machine.send(Signal::Tick).unwrap(), Outcome::NotHandled);
    assert_eq!(machine.source(), Unit::Root);
    assert_eq!(machine.current(), Unit::Leaf);
}

#[test]
fn root_can_swallow_everything_when_asked() {
    let definition = unit_builder("swallowing")
        .on_any_event(Unit::Root, |m, _| {
            m.context_mut().push("root");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(definition, Vec::new()).unwrap();

    assert_eq!(machine.send(Signal::Other).unwrap(), Outcome::Handled);
    assert_eq!(machine.context(), &vec!["root"]);
}

#[test]
fn nested_dispatch_is_rejected() {
    let definition = unit_builder("reentrant")
        .on_event(Unit::Leaf, Signal::Tick, |m, _| m.send(Signal::Tock))
        .on_event(Unit::Leaf, Signal::Tock, |m, _| {
            m.context_mut().push("tock");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(definition, Vec::new()).unwrap();

    assert_eq!(
        machine.send(Signal::Tick),
        Err(HsmError::ReentrantDispatch {
            event: "Tock".to_string()
        })
    );
    assert_eq!(machine.current(), Unit::Leaf);
    assert!(machine.context().is_empty());

    // The guard is released once the failed dispatch returns.
    assert_eq!(machine.send(Signal::Tock).unwrap(), Outcome::Handled);
    assert_eq!(machine.context(), &vec!["tock"]);
}

#[test]
fn handler_error_stops_propagation() {
    let definition = unit_builder("failing")
        .on_event(Unit::Leaf, Signal::Tick, |m, _| {
            Err(HsmError::handler(m.source().name(), "sensor offline"))
        })
        .on_event(Unit::Parent, Signal::Tick, |m, _| {
            m.context_mut().push("parent");
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(definition, Vec::new()).unwrap();

    let error = machine.send(Signal::Tick).unwrap_err();
    assert_eq!(
        error,
        HsmError::HandlerFailed {
            state: "Leaf".to_string(),
            message: "sensor offline".to_string()
        }
    );
    assert!(machine.context().is_empty());
}

#[test]
fn payload_reaches_handler() {
    let definition = DefinitionBuilder::<Unit, Signal, u64, u64>::new("payload")
        .state(Unit::Parent, Unit::Root)
        .state(Unit::Leaf, Unit::Parent)
        .initial_transition(Unit::Root, Unit::Leaf)
        .on_event(Unit::Parent, Signal::Tick, |m, amount| {
            *m.context_mut() += *amount;
            Ok(Outcome::Handled)
        })
        .build()
        .unwrap();
    let mut machine = Machine::new(definition, 0).unwrap();

    machine.dispatch(Signal::Tick, &5).unwrap();
    machine.dispatch(Signal::Tick, &7).unwrap();
    assert_eq!(*machine.context(), 12);
}

#[test]
fn instances_share_a_definition_but_not_state() {
    let definition = unit_builder("shared")
        .on_event(Unit::Leaf, Signal::Tick, |m, _| m.transition(Unit::Parent))
        .build()
        .unwrap();
    let mut first = Machine::new(Arc::clone(&definition), Vec::new()).unwrap();
    let second = Machine::new(definition, Vec::new()).unwrap();

    first.send(Signal::Tick).unwrap();
    assert_eq!(first.current(), Unit::Parent);
    assert_eq!(second.current(), Unit::Leaf);
    assert_ne!(first.id(), second.id());
}

#[test]
fn build_errors_surface_before_any_machine_exists() {
    let cyclic = DefinitionBuilder::<Unit, Signal, Calls>::new("cyclic")
        .state(Unit::Parent, Unit::Leaf)
        .state(Unit::Leaf, Unit::Parent)
        .build();
    assert!(matches!(cyclic, Err(BuildError::InvalidHierarchy(_))));

    let undeclared = DefinitionBuilder::<Unit, Signal, Calls>::new("undeclared")
        .state(Unit::Parent, Unit::Root)
        .on_entry(Unit::Leaf, |_, _| {})
        .build();
    assert!(matches!(
        undeclared,
        Err(BuildError::UnknownHandlerState {
            registration: "on_entry",
            ..
        })
    ));

    let upward = unit_builder("upward")
        .initial_transition(Unit::Leaf, Unit::Parent)
        .build();
    assert!(matches!(
        upward,
        Err(BuildError::InvalidInitialTarget { .. })
    ));
}

#[test]
fn config_loaded_from_json_bounds_history() {
    let config = MachineConfig::from_json(r#"{ "history_capacity": 2 }"#).unwrap();
    let definition = unit_builder("bounded")
        .on_event(Unit::Leaf, Signal::Tick, |m, _| m.transition(Unit::Leaf))
        .config(config)
        .build()
        .unwrap();
    let mut machine = Machine::new(definition, Vec::new()).unwrap();

    for _ in 0..5 {
        machine.send(Signal::Tick).unwrap();
    }
    assert_eq!(machine.history().len(), 2);
    assert_eq!(machine.history().path(), vec![Unit::Leaf, Unit::Leaf, Unit::Leaf]);
}

// Checkpoints of the fixture.

#[test]
fn fixture_checkpoint_resumes_mid_sequence() {
    let mut machine = Machine::new(fixture(), Fixture::default()).unwrap();
    for event in [Sig::A, Sig::B, Sig::D, Sig::E, Sig::I, Sig::F] {
        machine.send(event).unwrap();
    }
    let foo = machine.context().foo;

    let bytes = machine.checkpoint().to_bytes().unwrap();
    let checkpoint = Checkpoint::<Fx, Sig>::from_bytes(&bytes).unwrap();
    let context = Fixture {
        foo,
        log: Vec::new(),
    };
    let mut resumed = Machine::resume(fixture(), context, checkpoint).unwrap();

    assert_eq!(resumed.current(), Fx::S211);
    assert!(resumed.context().log.is_empty());
    for event in [Sig::I, Sig::I, Sig::F] {
        resumed.send(event).unwrap();
    }
    assert_eq!(resumed.current(), Fx::S11);
}

#[test]
fn fixture_checkpoint_round_trips_through_json() {
    let mut machine = Machine::new(fixture(), Fixture::default()).unwrap();
    machine.send(Sig::G).unwrap();

    let json = machine.checkpoint().to_json().unwrap();
    let checkpoint = Checkpoint::<Fx, Sig>::from_json(&json).unwrap();
    assert_eq!(checkpoint.current, Fx::S211);
    assert_eq!(checkpoint.last_event, Some(Sig::G));

    let resumed = Machine::resume(fixture(), Fixture::default(), checkpoint).unwrap();
    assert_eq!(resumed.last_event(), Some(Sig::G));
    assert_eq!(resumed.history().path(), machine.history().path());
}

#[test]
fn checkpoint_for_other_definition_is_refused() {
    let machine = Machine::new(fixture(), Fixture::default()).unwrap();
    let mut checkpoint = machine.checkpoint();
    checkpoint.definition = "something else".to_string();

    let result = Machine::resume(fixture(), Fixture::default(), checkpoint);
    assert!(matches!(
        result,
        Err(CheckpointError::DefinitionMismatch { .. })
    ));
}
