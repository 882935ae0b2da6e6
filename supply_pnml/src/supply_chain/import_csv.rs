use std::{fs::File, io::Read, path::Path};

use crate::error::InputError;

use super::tables::{Cell, ColumnConfig, SupplyChainTables, Table};

/// Default file names of the node, edge and demand tables inside a CSV directory
pub const CSV_FILE_NAMES: [&str; 3] = ["nodes.csv", "edges.csv", "demands.csv"];

///
/// Read one CSV table (first record is the header)
///
/// All cells are text; rows may have fewer or more fields than the header.
pub fn import_csv_table<R: Read>(name: &str, reader: R) -> Result<Table, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = Table::new(name, headers);
    for record in reader.records() {
        table.push_row(record?.iter().map(Cell::from_text).collect());
    }
    let (rows, cols) = table.shape();
    log::info!("table `{name}`: {rows} rows x {cols} columns");
    Ok(table)
}

fn read_table_file(dir: &Path, candidates: [&str; 2]) -> Result<Table, InputError> {
    let path = candidates
        .iter()
        .map(|file_name| dir.join(file_name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| dir.join(candidates[1]));
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::debug!("reading {}", path.display());
    import_csv_table(&name, File::open(&path)?)
}

///
/// Import the three supply-chain tables from a directory of CSV files
///
/// Each table is read from `<sheet name>.csv` (e.g. `节点输入.csv`) if present, otherwise
/// from the matching entry of [`CSV_FILE_NAMES`].
pub fn import_supply_chain_csv_dir<P: AsRef<Path>>(
    dir: P,
    columns: &ColumnConfig,
) -> Result<SupplyChainTables, InputError> {
    let dir = dir.as_ref();
    let by_sheet = |sheet: &str| format!("{sheet}.csv");
    let nodes = by_sheet(&columns.node_sheet);
    let edges = by_sheet(&columns.edge_sheet);
    let demands = by_sheet(&columns.demand_sheet);
    Ok(SupplyChainTables {
        nodes: read_table_file(dir, [nodes.as_str(), CSV_FILE_NAMES[0]])?,
        edges: read_table_file(dir, [edges.as_str(), CSV_FILE_NAMES[1]])?,
        demands: read_table_file(dir, [demands.as_str(), CSV_FILE_NAMES[2]])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_cells_are_text() {
        let data = "仓库名称, 等级 ,存储数量\n仓A,二级,50\n仓B,一级\n,,\n";
        let table = import_csv_table("nodes", data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["仓库名称", "等级", "存储数量"]);
        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.rows[0][2], Cell::Text("50".into()));
        assert_eq!(table.rows[1].len(), 2);
        assert_eq!(table.rows[2], vec![Cell::Empty; 3]);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_supply_chain_csv_dir(dir.path().join("nope"), &ColumnConfig::default());
        assert!(matches!(result, Err(InputError::Io(_))));
    }

    #[test]
    fn sheet_named_files_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("节点输入.csv"), "a\n1\n").unwrap();
        std::fs::write(dir.path().join("nodes.csv"), "b\n2\n").unwrap();
        std::fs::write(dir.path().join("edges.csv"), "c\n").unwrap();
        std::fs::write(dir.path().join("demands.csv"), "d\n").unwrap();
        let tables = import_supply_chain_csv_dir(dir.path(), &ColumnConfig::default()).unwrap();
        assert_eq!(tables.nodes.name, "节点输入");
        assert_eq!(tables.nodes.headers, vec!["a"]);
        assert_eq!(tables.edges.name, "edges");
        assert_eq!(tables.demands.shape(), (0, 1));
    }
}
