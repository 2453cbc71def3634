pub mod config;
pub mod error;
pub mod formulas;
pub mod napkin;
pub mod types;

#[cfg(feature = "flip")]
pub mod flip;

#[cfg(feature = "multi")]
pub mod multi;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "liquidity")]
pub mod liquidity;

#[cfg(feature = "acquisition")]
pub mod acquisition;

pub use error::ImmoInvestError;
pub use types::*;

/// Standard result type for all ImmoInvest operations
pub type ImmoInvestResult<T> = Result<T, ImmoInvestError>;
