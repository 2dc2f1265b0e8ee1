pub mod cleanup;
pub mod common;
pub mod domain;
pub mod driver;
pub mod orchestrator;
pub mod parser;
pub mod process;
pub mod sink;
pub mod waiter;
