// Library root: exposes the config layer and report pipeline so the binary
// and integration tests share one code path.

pub mod config;
pub mod report;
