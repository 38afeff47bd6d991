// src/checker/pool.rs
// =============================================================================
// A bounded worker pool for probe tasks.
//
// How it works:
// 1. Each job is an (index, url) pair
// 2. Jobs are turned into futures lazily, one per free slot
// 3. At most `workers` futures are in flight at the same time
// 4. Every finished job hands back (index, outcome); order is not preserved
//
// A panic inside one probe is caught at the task boundary and turned into
// Inactive, so one bad record can never take the whole batch down.
// =============================================================================

use futures::stream::{self, StreamExt};
use futures::FutureExt; // catch_unwind()
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::warn;

use super::aggregate::ProbeOutcome;

// Runs `probe` over every job with at most `workers` running concurrently
//
// Parameters:
//   jobs: (row index, url) pairs
//   workers: pool capacity (values below 1 are treated as 1)
//   on_complete: called with the running count of finished jobs
//   probe: the check to run for one url
//
// Returns: one (index, outcome) pair per job, in completion order
pub async fn run_bounded<J, F, Fut, P>(
    jobs: J,
    workers: usize,
    mut on_complete: P,
    probe: F,
) -> Vec<(usize, ProbeOutcome)>
where
    J: IntoIterator<Item = (usize, String)>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = ProbeOutcome>,
    P: FnMut(usize),
{
    let tasks = jobs.into_iter().map(|(index, url)| {
        let task = probe(url);
        async move {
            let outcome = AssertUnwindSafe(task)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    warn!(index, "probe task panicked, marking row inactive");
                    ProbeOutcome::Inactive
                });
            (index, outcome)
        }
    });

    // buffer_unordered(N) keeps at most N of these futures alive at once
    let mut finished = stream::iter(tasks).buffer_unordered(workers.max(1));

    let mut results = Vec::new();
    while let Some(result) = finished.next().await {
        results.push(result);
        on_complete(results.len());
    }
    results
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not tokio::spawn one task per url?
//    - 50,000 rows would mean 50,000 DNS lookups started at once
//    - buffer_unordered(N) only polls N futures at a time; the rest are
//      not even created until a slot frees up
//
// 2. What is catch_unwind?
//    - A panic normally unwinds through everything up to the runtime
//    - catch_unwind stops it at this future and hands us an Err instead
//    - AssertUnwindSafe is our promise that nothing shared is left
//      half-updated (each task only owns its own url and outcome)
//
// 3. Why return (index, outcome) pairs?
//    - Futures finish in whatever order the network answers
//    - The index travels with the result so the aggregator can put it
//      back in the right row
// -----------------------------------------------------------------------------
