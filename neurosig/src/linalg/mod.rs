//! Dense linear-algebra helpers backed by nalgebra.

mod companion;

pub use companion::*;
