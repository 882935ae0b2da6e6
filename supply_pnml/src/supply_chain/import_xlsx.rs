use std::{
    io::{Read, Seek},
    path::Path,
};

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use itertools::Itertools;

use crate::error::InputError;

use super::tables::{Cell, ColumnConfig, SupplyChainTables, Table};

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::from_text(s),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
            // `#N/A` and friends count as missing values
            Data::Error(_) | Data::Empty => Cell::Empty,
        }
    }
}

/// Turn a sheet into a [`Table`]; the first row holds the column headers
fn range_to_table(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|c| Cell::from(c).as_text().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let mut table = Table::new(name, headers);
    for row in rows {
        table.push_row(row.iter().map(Cell::from).collect());
    }
    let (rows, cols) = table.shape();
    log::info!("sheet `{name}`: {rows} rows x {cols} columns");
    table
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet: &str,
    position: usize,
    fallback_to_sheet_order: bool,
) -> Result<Table, InputError> {
    let sheet_names = workbook.sheet_names();
    if sheet_names.iter().any(|s| s == sheet) {
        let range = workbook.worksheet_range(sheet)?;
        return Ok(range_to_table(sheet, &range));
    }
    if fallback_to_sheet_order {
        if let Some(actual) = sheet_names.get(position) {
            log::warn!("sheet `{sheet}` not found, using sheet #{position} `{actual}` instead");
            let range = workbook.worksheet_range(actual)?;
            return Ok(range_to_table(actual, &range));
        }
    }
    Err(InputError::MissingSheet {
        sheet: sheet.to_string(),
        available: sheet_names.iter().join(", "),
    })
}

fn read_tables<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    columns: &ColumnConfig,
) -> Result<SupplyChainTables, InputError> {
    let fallback = columns.fallback_to_sheet_order;
    Ok(SupplyChainTables {
        nodes: read_sheet(workbook, &columns.node_sheet, 0, fallback)?,
        edges: read_sheet(workbook, &columns.edge_sheet, 1, fallback)?,
        demands: read_sheet(workbook, &columns.demand_sheet, 2, fallback)?,
    })
}

///
/// Import the three supply-chain tables from a spreadsheet given by a path
///
/// Supports `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods` (detected by [`calamine`]).
/// Sheets are looked up by the names in `columns`.
pub fn import_supply_chain_workbook_path<P: AsRef<Path>>(
    path: P,
    columns: &ColumnConfig,
) -> Result<SupplyChainTables, InputError> {
    let path = path.as_ref();
    log::debug!("opening workbook {}", path.display());
    let mut workbook = open_workbook_auto(path)?;
    read_tables(&mut workbook, columns)
}

///
/// Import the three supply-chain tables from an in-memory spreadsheet
///
/// See [`import_supply_chain_workbook_path`].
pub fn import_supply_chain_workbook<RS>(
    reader: RS,
    columns: &ColumnConfig,
) -> Result<SupplyChainTables, InputError>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(reader)?;
    read_tables(&mut workbook, columns)
}
