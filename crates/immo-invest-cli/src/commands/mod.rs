pub mod acquisition;
pub mod comparison;
pub mod flip;
pub mod liquidity;
pub mod multi;
pub mod napkin;
