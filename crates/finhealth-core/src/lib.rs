pub mod error;
pub(crate) mod math;
pub mod types;

#[cfg(feature = "analysis")]
pub mod analysis;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "forecast")]
pub mod forecast;

#[cfg(feature = "working_capital")]
pub mod working_capital;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "workflows")]
pub mod workflows;

pub use error::FinHealthError;
pub use types::*;

/// Standard result type for all fallible finhealth operations
pub type FinHealthResult<T> = Result<T, FinHealthError>;
