// Opt-in daily digest: hourly gating and the batch that drives per-investor runs.

pub mod batch;
pub mod handlers;
pub mod schedule;
