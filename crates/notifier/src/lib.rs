//! Newsletter delivery pipeline: the Redis-backed message channel, the
//! dispatch workers that drain it, the HTML template renderer and the SMTP
//! mail transport.
//!
//! Producers (the scheduler trigger) and consumers (the worker pool) are
//! decoupled in time and process; the channel is at-least-once, so the
//! worker is written to be safely re-invokable with the same job.

pub mod mailer;
pub mod queue;
pub mod template;
pub mod worker;
