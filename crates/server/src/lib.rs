pub mod errors;
pub mod state;
pub mod middleware;
pub mod routes;
pub mod startup;

pub use startup::{build_app, run};
