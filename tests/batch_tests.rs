use statforge::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-entity state the batched turns operate on. Hosts keep shared
/// handles to the rules and bus inside the context so queued actions
/// can run the full mutation pipeline.
struct World {
    stats: HashMap<StatName, Stat>,
    rules: Arc<ValidationRegistry>,
    bus: Arc<EventBus>,
}

impl World {
    fn new(rules: Arc<ValidationRegistry>, bus: Arc<EventBus>) -> Self {
        let mut stats = HashMap::new();
        stats.insert(
            StatName::new("health"),
            Stat::bounded("health", 100.0, 0.0, 100.0).unwrap(),
        );
        stats.insert(
            StatName::new("mana"),
            Stat::bounded("mana", 30.0, 0.0, 50.0).unwrap(),
        );
        Self { stats, rules, bus }
    }

    fn value_of(&mut self, name: &str) -> f64 {
        self.stats.get_mut(name).value_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TurnEnded {
    turn: u32,
}

fn poison_tick(w: &mut World) -> Result<(), BoxError> {
    let rules = Arc::clone(&w.rules);
    let bus = Arc::clone(&w.bus);
    if let Some(health) = w.stats.get_mut("health") {
        let current = health.value();
        health.set_value(current - 10.0, &rules, &bus);
    }
    Ok(())
}

fn mana_regen(w: &mut World) -> Result<(), BoxError> {
    let rules = Arc::clone(&w.rules);
    let bus = Arc::clone(&w.bus);
    if let Some(mana) = w.stats.get_mut("mana") {
        let current = mana.value();
        mana.set_value(current + 5.0, &rules, &bus);
    }
    Ok(())
}

/// Test a batched end-of-turn touching several stats.
#[test]
fn test_batched_turn_applies_all_actions() {
    let rules = Arc::new(ValidationRegistry::new());
    let mut bus = EventBus::new();

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    bus.observe::<StatChanged, _>(move |e| {
        sink.lock().unwrap().push(format!("{} -> {}", e.name, e.new_value));
    });
    let sink = Arc::clone(&log);
    bus.observe::<TurnEnded, _>(move |e| sink.lock().unwrap().push(format!("turn {}", e.turn)));

    let bus = Arc::new(bus);
    let mut world = World::new(Arc::clone(&rules), Arc::clone(&bus));

    let mut batch = Batch::new();
    batch.queue_action("poison tick", poison_tick);
    batch.queue_action("mana regen", mana_regen);
    batch.queue_event(TurnEnded { turn: 1 });

    let receipt = batch.commit(&mut world, &bus).unwrap();
    assert_eq!(receipt.actions_applied, 2);
    assert_eq!(receipt.events_published, 1);

    assert_eq!(world.value_of("health"), 90.0);
    assert_eq!(world.value_of("mana"), 35.0);

    // Stat events fire as the actions run; the turn event trails them
    assert_eq!(
        *log.lock().unwrap(),
        vec!["health -> 90", "mana -> 35", "turn 1"]
    );
}

/// Test that a failing action keeps earlier work and drops the rest.
#[test]
fn test_failed_action_keeps_earlier_work() {
    let rules = Arc::new(ValidationRegistry::new());
    let mut bus = EventBus::new();

    let turns = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&turns);
    bus.observe::<TurnEnded, _>(move |_| *sink.lock().unwrap() += 1);

    let bus = Arc::new(bus);
    let mut world = World::new(Arc::clone(&rules), Arc::clone(&bus));

    let mut batch = Batch::new();
    batch.queue_action("poison tick", poison_tick);
    batch.queue_action("channel spell", |_: &mut World| {
        Err("interrupted while channeling".into())
    });
    batch.queue_action("mana regen", mana_regen);
    batch.queue_event(TurnEnded { turn: 2 });

    let err = batch.commit(&mut world, &bus).unwrap_err();
    match err {
        StatError::BatchActionFailed {
            label,
            index,
            applied,
            ..
        } => {
            assert_eq!(label, "channel spell");
            assert_eq!(index, 1);
            assert_eq!(applied, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The poison tick stays applied; the regen never ran
    assert_eq!(world.value_of("health"), 90.0);
    assert_eq!(world.value_of("mana"), 30.0);

    // The queued turn event never reached subscribers
    assert_eq!(*turns.lock().unwrap(), 0);
}

/// Test that a validation veto inside an action is not a batch failure.
#[test]
fn test_validation_veto_does_not_fail_batch() {
    let mut registry = ValidationRegistry::new();
    registry.add_rule("mana", "regen_cap", |v| v <= 32.0);
    let rules = Arc::new(registry);
    let bus = Arc::new(EventBus::new());
    let mut world = World::new(Arc::clone(&rules), Arc::clone(&bus));

    let mut batch = Batch::new();
    // The +5 regen would land at 35, over the rule's cap; the write is
    // refused but the action itself still succeeds
    batch.queue_action("mana regen", mana_regen);

    let receipt = batch.commit(&mut world, &bus).unwrap();
    assert_eq!(receipt.actions_applied, 1);
    assert_eq!(world.value_of("mana"), 30.0);
}

/// Test that queued events stay invisible until commit.
#[test]
fn test_events_defer_until_commit() {
    let rules = Arc::new(ValidationRegistry::new());
    let mut bus = EventBus::new();

    let turns = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&turns);
    bus.observe::<TurnEnded, _>(move |e| sink.lock().unwrap().push(e.turn));

    let bus = Arc::new(bus);
    let mut world = World::new(Arc::clone(&rules), Arc::clone(&bus));

    let mut batch = Batch::new();
    batch.queue_event(TurnEnded { turn: 7 });
    batch.queue_event(TurnEnded { turn: 8 });
    assert!(turns.lock().unwrap().is_empty());

    batch.commit(&mut world, &bus).unwrap();
    assert_eq!(*turns.lock().unwrap(), vec![7, 8]);
}

/// Test the scope guard committing when the turn block ends.
#[test]
fn test_scope_commits_when_turn_ends() {
    let rules = Arc::new(ValidationRegistry::new());
    let bus = Arc::new(EventBus::new());
    let mut world = World::new(Arc::clone(&rules), Arc::clone(&bus));

    {
        let mut scope = BatchScope::begin(&mut world, &bus);
        scope.queue_action("poison tick", poison_tick);
        scope.queue_action("mana regen", mana_regen);
        // No explicit commit: the guard flushes at the end of the block
    }

    assert_eq!(world.value_of("health"), 90.0);
    assert_eq!(world.value_of("mana"), 35.0);
}

/// Test abandoning a scoped turn before it lands.
#[test]
fn test_scope_abandon_discards_turn() {
    let rules = Arc::new(ValidationRegistry::new());
    let bus = Arc::new(EventBus::new());
    let mut world = World::new(Arc::clone(&rules), Arc::clone(&bus));

    let mut scope = BatchScope::begin(&mut world, &bus);
    scope.queue_action("poison tick", poison_tick);
    scope.queue_event(TurnEnded { turn: 3 });
    assert_eq!(scope.action_count(), 1);
    assert_eq!(scope.event_count(), 1);
    scope.abandon();

    assert_eq!(world.value_of("health"), 100.0);
}

/// Test an explicit scope commit returning the receipt.
#[test]
fn test_scope_commit_returns_receipt() {
    let rules = Arc::new(ValidationRegistry::new());
    let bus = Arc::new(EventBus::new());
    let mut world = World::new(Arc::clone(&rules), Arc::clone(&bus));

    let mut scope = BatchScope::begin(&mut world, &bus);
    scope.queue_action("mana regen", mana_regen);
    scope.queue_event(TurnEnded { turn: 4 });

    let receipt = scope.commit().unwrap();
    assert_eq!(
        receipt,
        BatchReceipt {
            actions_applied: 1,
            events_published: 1,
        }
    );
}
