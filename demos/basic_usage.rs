// ============================================================================
// Basic Usage Example
// ============================================================================

use mdn2d::io::{self, Format, TextOptions};
use mdn2d::prelude::*;
use std::sync::Arc;

fn main() {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt::init();

    println!("=== MDN2D Example ===\n");

    let framework: Arc<dyn Framework> = Arc::new(StandaloneFramework::new("demo"));
    let new_number = |name: &str| {
        Mdn2dBuilder::decimal()
            .name(name)
            .framework(Arc::clone(&framework))
            .build()
            .unwrap()
    };

    // Integers carry into both neighbours
    let a = new_number("a");
    a.add_integer(Coord::ORIGIN, 17).unwrap();
    println!("a = 17:\n{a}\n");

    // Fractions cascade along the fraxis
    let b = new_number("b");
    b.add_real(Coord::ORIGIN, 2.5, 4, false, Fraxis::X).unwrap();
    println!("b = 2.5:\n{b}\n");

    let sum = new_number("sum");
    a.plus(&b, &sum).unwrap();
    println!("a + b:\n{sum}\n");

    let product = new_number("product");
    a.multiply(&b, &product).unwrap();
    println!("a * b:\n{product}\n");

    // Division reports the remaining magnitude
    let quotient = new_number("quotient");
    let remainder = product.divide(&b, &quotient, Fraxis::Default).unwrap();
    println!("(a * b) / b, remainder {remainder}:\n{quotient}\n");

    // Polymorphic carry points
    println!("=== Polymorphism ===");
    for (xy, kind) in a.polymorphic_nodes().iter() {
        println!("  {xy}: {kind:?}");
    }

    // Observers hear about the end of a number's life
    let observer: Arc<dyn Observer> = Arc::new(LoggingObserver);
    a.register_observer(Arc::downgrade(&observer));
    println!("\nObservers on a: {}", a.observer_count());

    // Serialization
    println!("\n=== Utility Text ===");
    let mut text = Vec::new();
    io::save(&sum, &mut text, Format::Utility, &TextOptions::default()).unwrap();
    println!("{}", String::from_utf8_lossy(&text));

    let mut snapshot = Vec::new();
    io::save(&sum, &mut snapshot, Format::Binary, &TextOptions::default()).unwrap();
    let restored = io::load(&mut snapshot.as_slice(), Arc::clone(&framework)).unwrap();
    println!(
        "\nBinary snapshot: {} bytes, restored as '{}', equal: {}",
        snapshot.len(),
        restored.name(),
        restored == sum
    );

    let stats = a.lock_stats();
    println!("\nLock stats for a: {stats:?}");
}
