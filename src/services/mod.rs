pub mod aggregate;
pub mod balances;
pub mod chart;
pub mod format;
pub mod portfolio;
pub mod transform;
