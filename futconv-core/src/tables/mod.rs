//! Static lookup tables: vendor code mapping and price multipliers.
//!
//! Both are plain immutable values. They are built once at startup (from a
//! built-in preset or a vendor profile file) and handed to the components
//! that need them.

pub mod code_mapping;
pub mod multiplier;

pub use code_mapping::CodeMapping;
pub use multiplier::{MultiplierError, MultiplierTable};
