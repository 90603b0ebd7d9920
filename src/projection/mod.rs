//! Turning intervals into calls and calls into totals.
//!
//! - per-constituency decision from party intervals (`resolver`)
//! - seat tally and government verdict (`seats`)
//! - national vote share from sample proportions and turnout (`votes`)

pub mod resolver;
pub mod seats;
pub mod votes;

pub use resolver::*;
pub use seats::*;
pub use votes::*;
