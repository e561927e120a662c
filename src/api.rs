//! Wire contract with the diagnostic backend
//!
//! Request shapes are strict. The chat response shape is deliberately loose:
//! every field may be missing or null, and it is the reconciliation step in
//! the session core that turns it into renderable state.

mod types;

pub use types::*;
