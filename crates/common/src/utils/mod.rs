pub mod logging;
pub mod access_log;
