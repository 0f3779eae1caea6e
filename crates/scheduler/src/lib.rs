//! Weekly newsletter trigger.
//!
//! Owns the recurring schedule (default Monday 08:30 UTC) and the fan-out:
//! on each firing, every opted-in subscriber gets exactly one job on the
//! newsletter channel. The trigger never waits for downstream delivery.

pub mod schedule;
pub mod trigger;
