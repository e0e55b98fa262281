//! Report module - ranking files, result tables, agreement scores and run summaries

pub mod agreement;
pub mod ranking_file;
pub mod run_export;
pub mod summary;
pub mod table_file;

pub use agreement::*;
pub use ranking_file::*;
pub use run_export::*;
pub use summary::*;
pub use table_file::*;
