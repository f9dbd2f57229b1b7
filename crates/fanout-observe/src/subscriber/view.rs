use fanout_model::PoolEvent;
use tracing::{debug, trace};

#[inline]
pub fn message_for(event: &PoolEvent) -> &'static str {
    match event {
        PoolEvent::TaskLaunched { .. } => "task launched (entry inserted)",
        PoolEvent::TaskCollected { .. } => "task finished and collected",
        PoolEvent::PoolFull { .. } => "pool full; waiting for a slot",
        PoolEvent::DrainStarted { .. } => "input exhausted; draining",
        PoolEvent::DrainFinished { .. } => "drain finished",
    }
}

#[inline]
pub fn log_event(event: &PoolEvent) {
    let msg = message_for(event);

    match event {
        PoolEvent::TaskLaunched {
            id,
            invocation,
            live,
        } => debug!(target: "fanout.pool", task = %id, %invocation, live, "{msg}"),
        PoolEvent::TaskCollected {
            report,
            by,
            elapsed,
            live,
        } => {
            if report.succeeded() {
                debug!(
                    target: "fanout.pool",
                    task = %report.id,
                    by = by.as_str(),
                    attempts = report.attempts(),
                    status = %report.outcome,
                    elapsed_ms = elapsed.as_millis() as u64,
                    live,
                    "{msg}"
                )
            } else {
                debug!(
                    target: "fanout.pool",
                    task = %report.id,
                    by = by.as_str(),
                    attempts = report.attempts(),
                    status = %report.outcome,
                    verdict = ?report.verdict,
                    elapsed_ms = elapsed.as_millis() as u64,
                    live,
                    "task gave up after exhausting reruns"
                )
            }
        }
        PoolEvent::PoolFull { live } => trace!(target: "fanout.pool", live, "{msg}"),
        PoolEvent::DrainStarted { live } => debug!(target: "fanout.pool", live, "{msg}"),
        PoolEvent::DrainFinished { launched } => debug!(target: "fanout.pool", launched, "{msg}"),
    }
}
