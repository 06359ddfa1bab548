// NOTE: the binary plays host for one extension instance per invocation.
// Every command starts the aggregator over the configured storage, talks to
// it the way the popup would (wire-form viewer messages), and shuts it down
// again. With the sqlite backend state carries over between invocations;
// with the memory backend each invocation starts empty.

mod args;
mod commands;
mod context;
mod handlers;
mod output;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
