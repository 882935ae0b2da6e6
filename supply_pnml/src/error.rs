//! Error types

/// Fatal problems with the input tables
///
/// Any of these aborts a conversion before the net is built. Problems confined to a
/// single row are reported as [`RowIssue`](crate::supply_chain::tables::RowIssue)s instead.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The workbook could not be opened or a sheet could not be decoded
    #[cfg(feature = "xlsx")]
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// A required sheet is missing from the workbook
    #[error("sheet `{sheet}` not found (available: {available})")]
    MissingSheet {
        /// Name of the sheet that was looked up
        sheet: String,
        /// Comma separated list of the sheets present
        available: String,
    },

    /// A required column header is missing from a table
    #[error("table `{table}` has no column `{column}`")]
    MissingColumn {
        /// Table name
        table: String,
        /// Expected header text
        column: String,
    },

    /// CSV error
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input format is not supported (or its feature is disabled)
    #[error("unsupported input format `{0}`")]
    UnsupportedFormat(String),
}

/// Structural violations when mutating a [`PetriNet`](crate::PetriNet)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
pub enum NetError {
    /// A place or transition with this id exists already
    #[error("node id `{0}` is already in use")]
    DuplicateNode(String),
    /// An arc with this id exists already
    #[error("arc id `{0}` is already in use")]
    DuplicateArc(String),
    /// An arc endpoint is not part of the net
    #[error("arc `{arc}` references unknown node `{node}`")]
    UnknownEndpoint {
        /// Arc id
        arc: String,
        /// Missing node id
        node: String,
    },
}

/// Errors while writing a net out
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unsupported Format
    #[error("unsupported output format `{0}`")]
    UnsupportedFormat(String),
}
