//! Mathematical utilities: standard-normal critical values.

pub mod normal;

pub use normal::*;
