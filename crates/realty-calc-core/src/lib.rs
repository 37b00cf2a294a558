pub mod amortization;
pub mod error;
pub mod form;
pub mod format;
pub mod policy;
pub mod types;

#[cfg(feature = "purchase_cost")]
pub mod purchase_cost;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "subscription")]
pub mod subscription;

pub use error::RealtyCalcError;
pub use types::*;

/// Standard result type for all realty calculations
pub type RealtyCalcResult<T> = Result<T, RealtyCalcError>;
