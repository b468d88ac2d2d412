pub mod configuration;
pub mod domain;
pub mod mirrors;
pub mod resolver;
pub mod routes;
pub mod startup;
pub mod state;
pub mod telemetry;

pub use resolver::{ResolveError, Resolver};
