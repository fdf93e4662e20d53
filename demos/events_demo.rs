/*!
 * Pipeline Event Stream Demonstration
 *
 * Shows how to subscribe to the pipeline's event stream while a sieve run
 * is in flight: prime reports, topology growth, and per-stage drain
 * summaries arrive as they happen.
 *
 * Run with: cargo run --example events_demo
 */

use primeline::{run_sieve_impl, PipelineEvent, PipelineEventPublisher, SieveConfig};
use std::thread;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Primeline Event Stream Demo ===\n");

    let (publisher, subscriber) = PipelineEventPublisher::unbounded();

    let listener = thread::spawn(move || {
        for event in subscriber.receiver().iter() {
            match event {
                PipelineEvent::StageSpawned { stage, .. } => {
                    println!("  [topology] stage {} started", stage);
                }
                PipelineEvent::PrimeFound { stage, value, .. } => {
                    println!("prime {} (stage {})", value, stage);
                }
                PipelineEvent::CandidatesFed { count, .. } => {
                    println!("  [feeder] {} candidates fed", count);
                }
                PipelineEvent::StageDrained {
                    stage,
                    forwarded,
                    discarded,
                    ..
                } => {
                    println!(
                        "  [drain] stage {}: {} forwarded, {} discarded",
                        stage, forwarded, discarded
                    );
                }
                PipelineEvent::StageFailed { stage, error, .. } => {
                    println!("  [failure] stage {}: {}", stage, error);
                }
            }
        }
    });

    let config = SieveConfig {
        max_candidate: 30,
        ..SieveConfig::default()
    };
    let report = run_sieve_impl(&config, Some(&publisher))?;
    drop(publisher);
    listener.join().expect("listener thread panicked");

    println!(
        "\n{} primes in {:?} across {} units",
        report.primes.len(),
        report.duration,
        report.stats.units_spawned
    );
    Ok(())
}
