use std::io::{Read, Write};
use std::path::Path;

use crate::{
    error::{ExportError, InputError},
    petri_net::{
        export_pnml::{export_petri_net_to_pnml, PnmlOptions},
        petri_net_struct::PetriNet,
    },
    supply_chain::{
        import_csv::import_supply_chain_csv_dir,
        tables::{ColumnConfig, SupplyChainTables},
    },
    utils::xml_utils::XMLWriterWrapper,
};

/// Trait for importing types from a file path or reader
pub trait Importable: Sized {
    /// The error type returned by import operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Import from a reader, specifying the format.
    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error>;

    /// Import from a file path.
    /// The format is inferred from the file extension.
    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        let format = Self::infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Self::import_from_reader(reader, &format)
    }

    /// Import from a byte slice, specifying the format.
    fn import_from_bytes(bytes: &[u8], format: &str) -> Result<Self, Self::Error> {
        Self::import_from_reader(std::io::Cursor::new(bytes), format)
    }

    /// Infer format from path.
    fn infer_format(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
    }
}

/// Trait for exporting types to a file path or writer
pub trait Exportable {
    /// The error type returned by export operations
    type Error: std::error::Error + Send + Sync + 'static + From<std::io::Error>;

    /// Export to a writer, specifying the format.
    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error>;

    /// Export to a file path.
    /// The format is inferred from the file extension.
    fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let format = Self::infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        Self::export_to_writer(self, writer, &format)
    }

    /// Infer format from path.
    fn infer_format(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
    }
}

/// Spreadsheet formats [`calamine`] can read
pub const WORKBOOK_FORMATS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

impl Importable for SupplyChainTables {
    type Error = InputError;

    /// Import a workbook with the default sheet names (see [`ColumnConfig`])
    ///
    /// `format` is one of [`WORKBOOK_FORMATS`]; the reader is buffered in memory.
    fn import_from_reader<R: Read>(mut reader: R, format: &str) -> Result<Self, Self::Error> {
        let format = format.trim_start_matches('.').to_lowercase();
        if !WORKBOOK_FORMATS.contains(&format.as_str()) {
            return Err(InputError::UnsupportedFormat(format));
        }
        #[cfg(feature = "xlsx")]
        {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            crate::supply_chain::import_xlsx::import_supply_chain_workbook(
                std::io::Cursor::new(bytes),
                &ColumnConfig::default(),
            )
        }
        #[cfg(not(feature = "xlsx"))]
        {
            let _ = &mut reader;
            Err(InputError::UnsupportedFormat(format))
        }
    }

    /// Import a workbook file, or a directory of CSV tables
    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        if path.is_dir() {
            return import_supply_chain_csv_dir(path, &ColumnConfig::default());
        }
        let format = Self::infer_format(path)
            .ok_or_else(|| InputError::UnsupportedFormat(path.display().to_string()))?;
        Self::import_from_reader(std::io::BufReader::new(std::fs::File::open(path)?), &format)
    }
}

impl Exportable for PetriNet {
    type Error = ExportError;

    /// `pnml` (default [`PnmlOptions`]) or `json`
    fn export_to_writer<W: Write>(&self, mut writer: W, format: &str) -> Result<(), Self::Error> {
        match format.trim_start_matches('.').to_lowercase().as_str() {
            "pnml" | "xml" => {
                let options = PnmlOptions::default();
                export_petri_net_to_pnml(self, &options, XMLWriterWrapper::for_pnml(writer, &options))
            }
            "json" => {
                serde_json::to_writer_pretty(&mut writer, self)?;
                writer.flush()?;
                Ok(())
            }
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}
