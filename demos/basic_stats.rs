//! Basic example: bounded stats and validated writes
//!
//! This example demonstrates:
//! - Creating bounded stats
//! - Writing values through the validation pipeline
//! - Observing committed changes on the event bus

use statforge::*;

fn main() -> Result<(), StatError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Rules are keyed by stat name; this one refuses a dead-but-not-zero state
    let mut rules = ValidationRegistry::new();
    rules.add_rule("health", "alive", |v| v > 0.0);

    // Every committed change is announced here
    let mut bus = EventBus::new();
    bus.observe::<StatChanged, _>(|e| {
        println!("  [event] {} changed {:.1} -> {:.1}", e.name, e.old_value, e.new_value);
    });

    let mut health = Stat::bounded("health", 100.0, 0.0, 100.0)?;
    println!("health starts at {:.1} / {:.1}", health.value(), health.max_value());

    println!("\nTaking 35 damage:");
    health.set_value(65.0, &rules, &bus);
    println!("  value: {:.1} ({:.0}% full)", health.value(), health.percentage() * 100.0);

    println!("\nDrinking an oversized potion (target 500):");
    health.set_value(500.0, &rules, &bus);
    println!("  value clamped to the cap: {:.1}", health.value());

    println!("\nApplying a lethal hit (target -20, clamps to 0):");
    let accepted = health.set_value(-20.0, &rules, &bus);
    println!("  write accepted: {accepted} (the `alive` rule refused 0)");
    println!("  value unchanged: {:.1}", health.value());

    Ok(())
}
