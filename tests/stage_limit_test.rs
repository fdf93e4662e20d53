/*!
 * Integration tests for stage-ceiling refusals mid-run
 *
 * A finite max_stages turns chain growth into a refusable operation, which
 * exercises the partial-failure contract: primes already reported stand,
 * the run exits non-zero, and nothing stays blocked.
 */

use primeline::error::{PrimelineError, EXIT_PARTIAL};
use primeline::{run_sieve_impl, PipelineEvent, PipelineEventPublisher, SieveConfig};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn limited_config(max_candidate: u64, max_stages: usize) -> SieveConfig {
    SieveConfig {
        max_candidate,
        max_stages,
        ..SieveConfig::default()
    }
}

fn streamed_primes(events: &[PipelineEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match event {
            PipelineEvent::PrimeFound { value, .. } => Some(*value),
            _ => None,
        })
        .collect()
}

#[test]
fn test_refused_fourth_stage_keeps_first_three_primes() {
    let (publisher, subscriber) = PipelineEventPublisher::unbounded();

    let err = run_sieve_impl(&limited_config(35, 3), Some(&publisher)).unwrap_err();
    drop(publisher);
    let events: Vec<PipelineEvent> = subscriber.receiver().try_iter().collect();

    // Stages 0..2 designated 2, 3, 5 before the ceiling refused stage 3.
    assert_eq!(streamed_primes(&events), vec![2, 3, 5]);
    assert!(matches!(
        err,
        PrimelineError::StageLimit { stage: 3, limit: 3 }
    ));
    assert_eq!(err.exit_code(), EXIT_PARTIAL);
    assert!(!err.is_fatal());
}

#[test]
fn test_refusal_is_reported_as_a_stage_failure_event() {
    let (publisher, subscriber) = PipelineEventPublisher::unbounded();

    run_sieve_impl(&limited_config(35, 3), Some(&publisher)).unwrap_err();
    drop(publisher);
    let events: Vec<PipelineEvent> = subscriber.receiver().try_iter().collect();

    // Stage 2 hit the ceiling trying to grow stage 3.
    let failure = events.iter().find_map(|event| match event {
        PipelineEvent::StageFailed { stage, error, .. } => Some((*stage, error.clone())),
        _ => None,
    });
    let (stage, error) = failure.expect("expected a stage failure event");
    assert_eq!(stage, 2);
    assert!(error.contains("ceiling"));
}

#[test]
fn test_every_started_stage_still_drains_after_the_refusal() {
    let (publisher, subscriber) = PipelineEventPublisher::unbounded();

    run_sieve_impl(&limited_config(35, 3), Some(&publisher)).unwrap_err();
    drop(publisher);
    let events: Vec<PipelineEvent> = subscriber.receiver().try_iter().collect();

    let spawned = events
        .iter()
        .filter(|event| matches!(event, PipelineEvent::StageSpawned { .. }))
        .count();
    let drained = events
        .iter()
        .filter(|event| matches!(event, PipelineEvent::StageDrained { .. }))
        .count();
    assert_eq!(spawned, 3);
    assert_eq!(drained, spawned);
}

#[test]
fn test_ceiling_of_one_reports_only_the_first_prime() {
    let (publisher, subscriber) = PipelineEventPublisher::unbounded();

    let err = run_sieve_impl(&limited_config(35, 1), Some(&publisher)).unwrap_err();
    drop(publisher);
    let events: Vec<PipelineEvent> = subscriber.receiver().try_iter().collect();

    assert_eq!(streamed_primes(&events), vec![2]);
    assert!(matches!(
        err,
        PrimelineError::StageLimit { stage: 1, limit: 1 }
    ));
}

#[test]
fn test_refusal_never_leaves_the_chain_blocked() {
    // The refusal lands mid-stream with the feeder still pushing, which is
    // exactly when a missed close would deadlock the chain.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(run_sieve_impl(&limited_config(500, 3), None).unwrap_err());
    });

    let err = rx
        .recv_timeout(Duration::from_secs(60))
        .expect("refusal must not leave the chain blocked");
    assert!(matches!(err, PrimelineError::StageLimit { .. }));
}

#[test]
fn test_generous_ceiling_behaves_like_unlimited() {
    let unlimited = run_sieve_impl(&limited_config(60, 0), None).unwrap();
    let generous = run_sieve_impl(&limited_config(60, 1000), None).unwrap();
    assert_eq!(unlimited.primes, generous.primes);
}
