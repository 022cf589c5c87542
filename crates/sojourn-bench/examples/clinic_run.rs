//! End-to-end run of the clinic network.
//!
//! Demonstrates: build config → analyze → simulate → compare → reset → repeat.

use sojourn_bench::reference_profile;
use sojourn_engine::NetworkEngine;
use sojourn_theory::analyze_network;

fn main() {
    println!("=== Sojourn Clinic Example ===\n");

    let config = reference_profile();
    let network = config.resolve().unwrap();
    let analysis = analyze_network(&network).unwrap();

    println!("Steady-state prediction:");
    for node in &analysis.nodes {
        let spec = &network.nodes()[node.node.index()];
        println!(
            "  {:<10} λ={:>6.2}/h  ρ={:>5.3}  Wq={:>7.2} min  [{}]",
            spec.label(),
            node.arrival_rate,
            node.metrics.rho,
            node.metrics.wq * 60.0,
            node.metrics.note
        );
    }

    let mut engine = NetworkEngine::new(config, 42).unwrap();
    for episode in 0..2 {
        engine.advance(8.0 * 60.0, 0.1).unwrap();
        let snap = engine.snapshot();
        println!(
            "\nEpisode {episode}: {} ticks, {:.0} minutes, {} exited",
            snap.tick(),
            snap.time(),
            snap.exit_count()
        );
        for (spec, node) in network.nodes().iter().zip(snap.nodes()) {
            let stats = node.stats();
            println!(
                "  {:<10} served={:>5}  blocked={:>4}  Wq={:>7.2} min  util={:>5.3}",
                spec.label(),
                stats.served_count,
                stats.blocked_count,
                stats.current_wq,
                stats.mean_utilization(snap.time(), spec.server_count)
            );
        }
        engine.reset(43 + episode).unwrap();
    }
}
