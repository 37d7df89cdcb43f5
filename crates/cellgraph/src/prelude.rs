//! Prelude module - common imports for cellgraph users
//!
//! ```rust
//! use cellgraph::prelude::*;
//! ```

pub use crate::{
    Cell,
    CellError,
    CellEvent,
    CellId,
    ErrorKind,
    // Model
    Model,
    ModelError,
    ModelOptions,
    ModelResult,
    SubscriptionId,
    TabularCell,
    // Values
    Value,
};
