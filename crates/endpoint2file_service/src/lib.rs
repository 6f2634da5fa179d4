//! The endpoint2file service: a scheduled bridge between a remote report
//! endpoint and a local filesystem consumer.

pub mod logging;
pub mod scheduler;
