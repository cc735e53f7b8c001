pub mod cleaning;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod inference;
pub mod model;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod training;

#[cfg(test)]
mod test_support;
