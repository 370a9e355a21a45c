pub mod auth;
pub mod config;
pub mod datetime;
pub mod error;
pub mod http;
pub mod net;
pub mod record;
pub mod shell;
pub mod storage;
pub mod suites;
pub mod testing;

#[cfg(test)]
pub(crate) mod test_support;
