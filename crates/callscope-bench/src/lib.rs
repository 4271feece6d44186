//! Synthetic call graphs shared by the benches.

pub mod util;
