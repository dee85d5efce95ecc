//! Command implementations.

pub mod interval;
pub mod pdf;
pub mod simulate;

pub use self::interval::execute_interval;
pub use self::pdf::execute_pdf;
pub use self::simulate::execute_simulate;
