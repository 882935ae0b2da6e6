#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

///
/// Petri nets
///
pub mod petri_net {
    /// Export [`PetriNet`] to `.pnml`
    pub mod export_pnml;
    /// [`PetriNet`] struct
    pub mod petri_net_struct;

    #[doc(inline)]
    pub use petri_net_struct::PetriNet;
}

///
/// Supply-chain input tables (warehouses, transport edges, demands)
///
pub mod supply_chain {
    /// Import from a directory of CSV files
    pub mod import_csv;
    /// Import from spreadsheets (`.xlsx`, `.xls`, `.ods`, ...)
    ///
    /// __Requires the `xlsx` feature to be enabled__
    #[cfg(feature = "xlsx")]
    pub mod import_xlsx;
    /// Generic tables and typed input rows
    pub mod tables;

    #[doc(inline)]
    pub use tables::{SupplyChainRows, SupplyChainTables};
}

///
/// Conversion of supply-chain tables into a [`PetriNet`]
///
pub mod conversion {
    /// Layered layout of places and transitions
    pub mod layout;
    /// Assembling the net from typed rows
    pub mod net_builder;
    /// Label to identifier normalization
    pub mod normalize;
    /// [`ConversionOptions`](options::ConversionOptions) struct
    pub mod options;
}

/// IO traits
pub mod core;

/// Error types
pub mod error;

/// Util module with smaller helper functions, structs or enums
pub mod utils;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use petri_net::petri_net_struct::PetriNet;

#[doc(inline)]
pub use petri_net::export_pnml::export_petri_net_to_pnml;

#[doc(inline)]
pub use petri_net::export_pnml::export_petri_net_to_pnml_path;

#[doc(inline)]
pub use petri_net::export_pnml::export_petri_net_to_pnml_string;

#[doc(inline)]
pub use petri_net::export_pnml::PnmlOptions;

#[doc(inline)]
pub use conversion::net_builder::build_petri_net;

#[doc(inline)]
pub use conversion::net_builder::convert_tables;

#[doc(inline)]
pub use conversion::net_builder::{Conversion, Diagnostic};

#[doc(inline)]
pub use conversion::normalize::normalize_id;

#[doc(inline)]
pub use conversion::options::ConversionOptions;

#[doc(inline)]
pub use supply_chain::tables::SupplyChainTables;

#[doc(inline)]
pub use supply_chain::import_csv::import_supply_chain_csv_dir;

#[cfg(feature = "xlsx")]
#[doc(inline)]
pub use supply_chain::import_xlsx::import_supply_chain_workbook_path;

#[doc(inline)]
pub use error::{ExportError, InputError, NetError};

#[doc(inline)]
pub use crate::core::io::{Exportable, Importable};

///
/// Import the supply-chain tables from a workbook file or a CSV directory
///
/// Directories are read with [`import_supply_chain_csv_dir`], everything else as a
/// spreadsheet. Sheet and file names are taken from `options.columns`.
///
pub fn import_supply_chain_path<P: AsRef<std::path::Path>>(
    path: P,
    options: &ConversionOptions,
) -> Result<SupplyChainTables, InputError> {
    let path = path.as_ref();
    if path.is_dir() {
        return import_supply_chain_csv_dir(path, &options.columns);
    }
    #[cfg(feature = "xlsx")]
    {
        import_supply_chain_workbook_path(path, &options.columns)
    }
    #[cfg(not(feature = "xlsx"))]
    {
        Err(InputError::UnsupportedFormat(path.display().to_string()))
    }
}

///
/// Read a workbook (or CSV directory) and convert it into a [`PetriNet`]
///
/// Convenience wrapper around [`import_supply_chain_path`] and [`convert_tables`].
///
pub fn convert_path<P: AsRef<std::path::Path>>(
    path: P,
    options: &ConversionOptions,
) -> Result<Conversion, InputError> {
    let tables = import_supply_chain_path(path, options)?;
    convert_tables(&tables, options)
}
