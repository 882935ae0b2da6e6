//! Core traits

/// IO Traits
pub mod io;

pub use io::{Exportable, Importable};
