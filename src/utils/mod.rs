//! Utility module - diagnostics, progress bars and terminal styling

pub mod diagnostics;
pub mod progress;
pub mod styling;

pub use diagnostics::*;
pub use progress::*;
pub use styling::*;
