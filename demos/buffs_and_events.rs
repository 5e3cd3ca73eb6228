//! Buff example: timed modifiers and the event lifecycle
//!
//! This example demonstrates:
//! - Additive and multiplicative modifiers
//! - The fixed aggregation order (bonuses sum, then factors multiply)
//! - Timed buffs expiring lazily on read

use statforge::*;
use std::time::Duration;

fn main() -> Result<(), StatError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rules = ValidationRegistry::new();
    let mut bus = EventBus::new();
    bus.observe::<ModifierAdded, _>(|e| {
        println!("  [event] {} gained {} {:+.1}", e.name, e.kind, e.magnitude);
    });
    bus.observe::<ModifierRemoved, _>(|e| {
        println!("  [event] {} lost modifier {}", e.name, e.modifier_id);
    });
    bus.observe::<StatChanged, _>(|e| {
        println!("  [event] {} changed {:.1} -> {:.1}", e.name, e.old_value, e.new_value);
    });

    let mut attack = Stat::new("attack", 50.0);
    println!("attack starts at {:.1}", attack.value());

    println!("\nCasting a +15 strength blessing (100 ms):");
    attack.add_bonus(15.0, Some(Duration::from_millis(100)), &rules, &bus);

    println!("\nActivating a x1.5 rage (permanent):");
    let rage = attack
        .add_multiplier(1.5, None, &rules, &bus)
        .expect("no rules registered for attack");

    // (50 + 15) * 1.5 = 97.5
    println!("\naggregate: (50 + 15) * 1.5 = {:.1}", attack.value());

    println!("\nWaiting for the blessing to run out...");
    std::thread::sleep(Duration::from_millis(120));

    // The expired bonus is swept on this read, silently: 50 * 1.5 = 75
    println!("aggregate after expiry: 50 * 1.5 = {:.1}", attack.value());
    println!("modifiers left: {}", attack.modifier_count());

    println!("\nDispelling the rage:");
    attack.remove_modifier(rage, &rules, &bus);
    println!("aggregate back to base: {:.1}", attack.value());

    Ok(())
}
