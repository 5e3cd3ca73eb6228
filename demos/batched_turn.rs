//! Batch example: deferred end-of-turn commits
//!
//! This example demonstrates:
//! - Queuing labelled actions and domain events
//! - Committing a turn as a unit
//! - Partial failure: earlier actions stay, queued events never fire

use statforge::*;
use std::collections::HashMap;
use std::sync::Arc;

struct World {
    stats: HashMap<StatName, Stat>,
    rules: Arc<ValidationRegistry>,
    bus: Arc<EventBus>,
}

#[derive(Clone, Debug)]
struct TurnEnded {
    turn: u32,
}

fn poison_tick(w: &mut World) -> Result<(), BoxError> {
    let (rules, bus) = (Arc::clone(&w.rules), Arc::clone(&w.bus));
    if let Some(health) = w.stats.get_mut("health") {
        let current = health.value();
        health.set_value(current - 10.0, &rules, &bus);
    }
    Ok(())
}

fn mana_regen(w: &mut World) -> Result<(), BoxError> {
    let (rules, bus) = (Arc::clone(&w.rules), Arc::clone(&w.bus));
    if let Some(mana) = w.stats.get_mut("mana") {
        let current = mana.value();
        mana.set_value(current + 5.0, &rules, &bus);
    }
    Ok(())
}

fn main() -> Result<(), StatError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rules = Arc::new(ValidationRegistry::new());
    let mut bus = EventBus::new();
    bus.observe::<StatChanged, _>(|e| {
        println!("  [event] {} changed {:.1} -> {:.1}", e.name, e.old_value, e.new_value);
    });
    bus.observe::<TurnEnded, _>(|e| println!("  [event] turn {} ended", e.turn));
    let bus = Arc::new(bus);

    let mut stats = HashMap::new();
    stats.insert(
        StatName::new("health"),
        Stat::bounded("health", 100.0, 0.0, 100.0)?,
    );
    stats.insert(
        StatName::new("mana"),
        Stat::bounded("mana", 30.0, 0.0, 50.0)?,
    );
    let mut world = World {
        stats,
        rules: Arc::clone(&rules),
        bus: Arc::clone(&bus),
    };

    println!("Turn 1: poison ticks and mana regenerates");
    let mut batch = Batch::new();
    batch.queue_action("poison tick", poison_tick);
    batch.queue_action("mana regen", mana_regen);
    batch.queue_event(TurnEnded { turn: 1 });

    let receipt = batch.commit(&mut world, &bus)?;
    println!(
        "committed {} action(s) and {} event(s)\n",
        receipt.actions_applied, receipt.events_published
    );

    println!("Turn 2: a channeled spell is interrupted midway");
    let mut batch = Batch::new();
    batch.queue_action("poison tick", poison_tick);
    batch.queue_action("channel spell", |_: &mut World| {
        Err("interrupted by a silence".into())
    });
    batch.queue_action("mana regen", mana_regen);
    batch.queue_event(TurnEnded { turn: 2 });

    match batch.commit(&mut world, &bus) {
        Ok(_) => println!("unexpectedly committed"),
        Err(err) => println!("  batch failed: {err}"),
    }

    // Both poison ticks landed (100 - 10 - 10); only the first regen did
    let health = world.stats.get_mut("health").value_or_default();
    let mana = world.stats.get_mut("mana").value_or_default();
    println!("\nhealth: {health:.1}, mana: {mana:.1}");

    Ok(())
}
