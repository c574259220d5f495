pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod handoff;
pub mod http;
pub mod order;
pub mod parser;
pub mod period;
pub mod session;
pub mod storage;
