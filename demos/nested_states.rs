//! Nested States
//!
//! This example runs the classic nested-state test machine and prints
//! every exit, entry and event as it happens.
//!
//! Key concepts:
//! - Events bubble from the active leaf up to its ancestors
//! - Transitions exit up to the common ancestor, then enter down
//! - Initial transitions settle composite states into a leaf
//! - Guards are plain `if`s inside handlers
//! - Checkpoints capture the machine's position
//!
//! Run with: cargo run --example nested_states

use lineage::trace::TraceLog;
use lineage::{event_enum, state_enum, DefinitionBuilder, Machine, Outcome, State};
use std::sync::Arc;

state_enum! {
    enum Qhsm {
        Root,
        S,
        S1,
        S11,
        S2,
        S21,
        S211,
    }
    root: Root
}

event_enum! {
    enum Sig { A, B, C, D, E, F, G, H, I }
}

#[derive(Default)]
struct Flags {
    foo: bool,
}

fn main() {
    println!("=== Nested State Machine ===\n");

    let trace: Arc<TraceLog<Qhsm, Sig>> = Arc::new(TraceLog::new());
    let definition = DefinitionBuilder::<Qhsm, Sig, Flags>::new("qhsm")
        .states([
            (Qhsm::S, Qhsm::Root),
            (Qhsm::S1, Qhsm::S),
            (Qhsm::S11, Qhsm::S1),
            (Qhsm::S2, Qhsm::S),
            (Qhsm::S21, Qhsm::S2),
            (Qhsm::S211, Qhsm::S21),
        ])
        .on_any_entry(|s: &Qhsm, _: &mut Flags| println!("  {}-ENTRY", s.name()))
        .on_any_exit(|s: &Qhsm, _: &mut Flags| println!("  {}-EXIT", s.name()))
        .initial_transition(Qhsm::Root, Qhsm::S)
        .initial_transition(Qhsm::S, Qhsm::S11)
        .initial_transition(Qhsm::S1, Qhsm::S11)
        .initial_transition(Qhsm::S2, Qhsm::S211)
        .initial_transition(Qhsm::S21, Qhsm::S211)
        .on_event(Qhsm::S, Sig::E, |m, _| m.transition(Qhsm::S11))
        .on_event(Qhsm::S, Sig::I, |m, _| {
            if !m.context().foo {
                return Ok(Outcome::NotHandled);
            }
            m.context_mut().foo = false;
            Ok(Outcome::Handled)
        })
        .on_event(Qhsm::S1, Sig::A, |m, _| m.transition(Qhsm::S1))
        .on_event(Qhsm::S1, Sig::B, |m, _| m.transition(Qhsm::S11))
        .on_event(Qhsm::S1, Sig::C, |m, _| m.transition(Qhsm::S2))
        .on_event(Qhsm::S1, Sig::D, |m, _| {
            if m.context().foo {
                return Ok(Outcome::NotHandled);
            }
            m.transition_with(Qhsm::S, |flags: &mut Flags| flags.foo = true)
        })
        .on_event(Qhsm::S1, Sig::F, |m, _| m.transition(Qhsm::S211))
        .on_event(Qhsm::S1, Sig::I, |_, _| Ok(Outcome::Handled))
        .on_event(Qhsm::S11, Sig::D, |m, _| {
            if !m.context().foo {
                return Ok(Outcome::NotHandled);
            }
            m.transition_with(Qhsm::S1, |flags: &mut Flags| flags.foo = false)
        })
        .on_event(Qhsm::S11, Sig::G, |m, _| m.transition(Qhsm::S211))
        .on_event(Qhsm::S11, Sig::H, |m, _| m.transition(Qhsm::S))
        .on_event(Qhsm::S2, Sig::C, |m, _| m.transition(Qhsm::S1))
        .on_event(Qhsm::S2, Sig::F, |m, _| m.transition(Qhsm::S11))
        .on_event(Qhsm::S2, Sig::I, |m, _| {
            if m.context().foo {
                return Ok(Outcome::NotHandled);
            }
            m.context_mut().foo = true;
            Ok(Outcome::Handled)
        })
        .on_event(Qhsm::S21, Sig::A, |m, _| m.transition(Qhsm::S21))
        .on_event(Qhsm::S21, Sig::B, |m, _| m.transition(Qhsm::S211))
        .on_event(Qhsm::S21, Sig::G, |m, _| m.transition(Qhsm::S1))
        .on_event(Qhsm::S211, Sig::D, |m, _| m.transition(Qhsm::S21))
        .on_event(Qhsm::S211, Sig::H, |m, _| m.transition(Qhsm::S))
        .tracer(Arc::clone(&trace))
        .build()
        .unwrap();

    println!("Initializing:");
    let mut machine = Machine::new(definition, Flags::default()).unwrap();
    println!("Settled in {:?}\n", machine.current());

    for event in [Sig::A, Sig::B, Sig::D, Sig::E, Sig::I, Sig::F, Sig::I, Sig::I, Sig::F] {
        println!("{:?}:", event);
        let outcome = machine.send(event).unwrap();
        println!(
            "  -> {:?} ({:?}, foo = {})\n",
            machine.current(),
            outcome,
            machine.context().foo
        );
    }

    println!("Transitions recorded: {}", machine.history().len());
    println!("Path: {:?}", machine.history().path());
    println!("Tracer hook calls: {}\n", trace.events().len());

    let checkpoint = machine.checkpoint();
    match checkpoint.to_json() {
        Ok(json) => println!("Checkpoint ({} bytes of JSON) at {:?}", json.len(), checkpoint.current),
        Err(e) => println!("Checkpoint failed: {}", e),
    }

    println!("\n=== Example Complete ===");
}
