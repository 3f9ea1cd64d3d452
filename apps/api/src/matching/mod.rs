// Investor-to-startup matching.
// engine is pure; writer, dispatcher and run talk to the injected store and notifier.

pub mod dispatcher;
pub mod engine;
pub mod guard;
pub mod handlers;
pub mod redis_guard;
pub mod run;
pub mod writer;
