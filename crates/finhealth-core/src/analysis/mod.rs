pub mod benchmark;
pub mod health;
pub mod metrics;
pub mod recommendations;
