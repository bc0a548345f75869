//! Shared test helpers for integration tests

use pledge::Scheduler;

/// Build a fresh scheduler
pub fn scheduler() -> Scheduler {
    Scheduler::new()
}

/// Drain the scheduler, panicking on misuse
#[allow(dead_code)]
pub fn run(scheduler: &Scheduler) {
    scheduler.run_to_completion().unwrap();
}

/// Install a tracing subscriber for debugging test failures
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
