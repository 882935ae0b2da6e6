use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Input table a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowContext {
    /// Warehouse/node table
    Warehouse,
    /// Transport/edge table
    Transport,
    /// Demand/task table
    Demand,
}

impl Display for RowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RowContext::Warehouse => "node table",
            RowContext::Transport => "edge table",
            RowContext::Demand => "demand table",
        })
    }
}

/// What is wrong with a single data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowProblem {
    /// A required cell is empty; the row is skipped
    MissingValue {
        /// Column header
        column: String,
    },
    /// The tier cell holds no known tier; the row is skipped
    UnknownTier {
        /// Raw cell content
        value: String,
    },
    /// A numeric cell holds something else; the value counts as missing
    InvalidNumber {
        /// Column header
        column: String,
        /// Raw cell content
        value: String,
    },
}

impl Display for RowProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowProblem::MissingValue { column } => {
                write!(f, "column `{column}` is empty, row skipped")
            }
            RowProblem::UnknownTier { value } => write!(f, "unknown tier `{value}`, row skipped"),
            RowProblem::InvalidNumber { column, value } => write!(
                f,
                "`{value}` in column `{column}` is not a number, treated as missing"
            ),
        }
    }
}

/// A [`RowProblem`] together with the row it was found in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    /// Table of the row
    pub context: RowContext,
    /// 1-based data row
    pub row: usize,
    /// The problem
    pub problem: RowProblem,
}

///
/// A single cell of an input table
///
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No value
    #[default]
    Empty,
    /// Numeric value
    Number(f64),
    /// Text value (numbers stored as text are parsed on demand)
    Text(String),
    /// Boolean value
    Bool(bool),
}

impl Cell {
    /// Create a cell from raw text (e.g., a CSV field); blank text becomes [`Cell::Empty`]
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    /// Text content, trimmed; `None` for empty cells
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.is_nan() => None,
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Numeric content
    ///
    /// Empty cells and NaN (including the text `nan`) are `Ok(None)`.
    /// Returns `Err(())` if the cell holds something that is not a finite number.
    #[allow(clippy::result_unit_err)]
    pub fn as_number(&self) -> Result<Option<f64>, ()> {
        let n = match self {
            Cell::Empty => return Ok(None),
            Cell::Number(n) => *n,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse().map_err(|_| ())?
            }
            Cell::Bool(_) => return Err(()),
        };
        if n.is_nan() {
            Ok(None)
        } else if n.is_infinite() {
            Err(())
        } else {
            Ok(Some(n))
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => f.write_str(&format_number(*n)),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Render a number for PNML text: integral values without fractional part (`50`, not `50.0`)
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Key used to compare header texts: all whitespace removed
fn header_key(header: &str) -> String {
    header.chars().filter(|c| !c.is_whitespace()).collect()
}

///
/// A table of ordered rows with named columns (one sheet of the input workbook)
///
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table (sheet) name
    pub name: String,
    /// Column headers
    pub headers: Vec<String>,
    /// Data rows (without header row)
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a new table without rows
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a data row
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Index of the column with the given header (whitespace in headers is ignored)
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let key = header_key(header);
        self.headers.iter().position(|h| header_key(h) == key)
    }

    fn require_column(&self, header: &str) -> Result<usize, InputError> {
        self.column_index(header)
            .ok_or_else(|| InputError::MissingColumn {
                table: self.name.clone(),
                column: header.to_string(),
            })
    }

    /// Number of data rows and columns
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    /// Data rows which hold at least one non-empty cell, with their 1-based row number
    fn data_rows(&self) -> impl Iterator<Item = (usize, &[Cell])> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|c| c.as_text().is_some()))
            .map(|(i, row)| (i + 1, row.as_slice()))
    }
}

/// Looks up the cells of one row by column index and records what is wrong with them
struct RowReader<'a> {
    table: &'a Table,
    context: RowContext,
    row_number: usize,
    cells: &'a [Cell],
    issues: &'a mut Vec<RowIssue>,
}

impl RowReader<'_> {
    fn cell(&self, index: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.cells.get(index).unwrap_or(EMPTY)
    }

    fn report(&mut self, problem: RowProblem) {
        self.issues.push(RowIssue {
            context: self.context,
            row: self.row_number,
            problem,
        });
    }

    fn required_text(&mut self, index: usize) -> Option<String> {
        let text = self.cell(index).as_text();
        if text.is_none() {
            let column = self.table.headers[index].clone();
            self.report(RowProblem::MissingValue { column });
        }
        text
    }

    fn optional_number(&mut self, index: Option<usize>) -> Option<f64> {
        let index = index?;
        let number = self.cell(index).as_number();
        match number {
            Ok(n) => n,
            Err(()) => {
                let value = self.cell(index).to_string();
                let column = self.table.headers[index].clone();
                self.report(RowProblem::InvalidNumber { column, value });
                None
            }
        }
    }
}

///
/// Hierarchical layer of the supply chain, ordered left-to-right in the layout
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Third-tier (most upstream) warehouse
    Tier3,
    /// Second-tier warehouse
    Tier2,
    /// First-tier warehouse
    Tier1,
    /// End user
    User,
}

impl Tier {
    /// All tiers in layout order
    pub const ALL: [Tier; 4] = [Tier::Tier3, Tier::Tier2, Tier::Tier1, Tier::User];

    /// Position of the tier in layout order (0 for [`Tier::Tier3`])
    pub fn index(self) -> usize {
        match self {
            Tier::Tier3 => 0,
            Tier::Tier2 => 1,
            Tier::Tier1 => 2,
            Tier::User => 3,
        }
    }

    /// Guess the tier from substrings of a node name
    ///
    /// Legacy heuristic, only used when explicitly enabled. Names matching none of the
    /// patterns count as [`Tier::Tier1`].
    pub fn infer_from_name(name: &str) -> Tier {
        let name = name.to_lowercase();
        let has = |patterns: &[&str]| patterns.iter().any(|p| name.contains(p));
        if has(&["三级", "level3", "3级"]) {
            Tier::Tier3
        } else if has(&["二级", "level2", "2级"]) {
            Tier::Tier2
        } else if has(&["一级", "level1", "1级"]) {
            Tier::Tier1
        } else if has(&["用户", "user", "customer"]) {
            Tier::User
        } else {
            Tier::Tier1
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match header_key(s).to_lowercase().as_str() {
            "三级" | "3级" | "tier3" | "level3" | "3" => Ok(Tier::Tier3),
            "二级" | "2级" | "tier2" | "level2" | "2" => Ok(Tier::Tier2),
            "一级" | "1级" | "tier1" | "level1" | "1" => Ok(Tier::Tier1),
            "用户" | "user" | "users" | "customer" => Ok(Tier::User),
            _ => Err(s.to_string()),
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Tier::Tier3 => "Tier3",
            Tier::Tier2 => "Tier2",
            Tier::Tier1 => "Tier1",
            Tier::User => "User",
        })
    }
}

/// Where the tier of a warehouse row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierSource {
    /// The tier column
    Column,
    /// The legacy name heuristic ([`Tier::infer_from_name`])
    InferredFromName,
}

/// One physical warehouse or user node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputWarehouseRow {
    /// 1-based row number in the source table
    pub row: usize,
    /// Warehouse name
    pub name: String,
    /// Tier (authoritative for layout)
    pub tier: Tier,
    /// How `tier` was determined
    pub tier_source: TierSource,
    /// Stored quantity
    pub quantity: Option<f64>,
    /// Longitude
    pub longitude: Option<f64>,
    /// Latitude
    pub latitude: Option<f64>,
}

/// A directed transport link between two warehouses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTransportRow {
    /// 1-based row number in the source table
    pub row: usize,
    /// Name of the shipping warehouse
    pub from_warehouse: String,
    /// Name of the receiving warehouse
    pub to_warehouse: String,
    /// Transit time
    pub transit_time: Option<f64>,
}

/// A demand task a user issues against the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDemandRow {
    /// 1-based row number in the source table
    pub row: usize,
    /// Task name
    pub task_name: String,
    /// Name of the user warehouse the task feeds
    pub user_warehouse: String,
    /// Requested quantity
    pub quantity: Option<f64>,
}

///
/// Sheet names and header texts of the input workbook
///
/// Header matching ignores whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Sheet holding the warehouse/node rows
    pub node_sheet: String,
    /// Sheet holding the transport/edge rows
    pub edge_sheet: String,
    /// Sheet holding the demand/task rows
    pub demand_sheet: String,
    /// Use the first three sheets (in order) if a named sheet is missing
    pub fallback_to_sheet_order: bool,

    /// Node table: warehouse name
    pub warehouse_name: String,
    /// Node table: tier
    pub tier: String,
    /// Node table: stored quantity
    pub stored_quantity: String,
    /// Node table: longitude
    pub longitude: String,
    /// Node table: latitude
    pub latitude: String,

    /// Edge table: shipping warehouse
    pub edge_from: String,
    /// Edge table: receiving warehouse
    pub edge_to: String,
    /// Edge table: transit time
    pub transit_time: String,

    /// Demand table: task name
    pub task_name: String,
    /// Demand table: user warehouse
    pub user_warehouse: String,
    /// Demand table: requested quantity
    pub demand_quantity: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            node_sheet: "节点输入".into(),
            edge_sheet: "连边输入".into(),
            demand_sheet: "需求输入".into(),
            fallback_to_sheet_order: false,
            warehouse_name: "仓库名称".into(),
            tier: "等级".into(),
            stored_quantity: "存储数量".into(),
            longitude: "经度".into(),
            latitude: "纬度".into(),
            edge_from: "（出）仓库名称".into(),
            edge_to: "（入）仓库名称".into(),
            transit_time: "运输时间".into(),
            task_name: "任务名称".into(),
            user_warehouse: "仓库名称\n（用户）".into(),
            demand_quantity: "糖豆数量".into(),
        }
    }
}

///
/// The three raw input tables
///
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplyChainTables {
    /// Warehouse/node table
    pub nodes: Table,
    /// Transport/edge table
    pub edges: Table,
    /// Demand/task table
    pub demands: Table,
}

///
/// The three input tables as typed rows
///
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplyChainRows {
    /// Warehouse rows
    pub warehouses: Vec<InputWarehouseRow>,
    /// Transport rows
    pub transports: Vec<InputTransportRow>,
    /// Demand rows
    pub demands: Vec<InputDemandRow>,
    /// Problems with single rows, in table order
    pub issues: Vec<RowIssue>,
}

impl SupplyChainTables {
    /// Map the named columns of all three tables to typed rows
    ///
    /// Only a missing required column is fatal. Rows with an empty required cell or an
    /// unknown tier (unless `infer_tier_from_name` is set) are skipped, unparsable numbers
    /// count as missing; both end up in [`SupplyChainRows::issues`].
    pub fn to_rows(
        &self,
        columns: &ColumnConfig,
        infer_tier_from_name: bool,
    ) -> Result<SupplyChainRows, InputError> {
        let mut issues = Vec::new();
        let warehouses = warehouse_rows(&self.nodes, columns, infer_tier_from_name, &mut issues)?;
        let transports = transport_rows(&self.edges, columns, &mut issues)?;
        let demands = demand_rows(&self.demands, columns, &mut issues)?;
        Ok(SupplyChainRows {
            warehouses,
            transports,
            demands,
            issues,
        })
    }
}

fn warehouse_rows(
    table: &Table,
    columns: &ColumnConfig,
    infer_tier_from_name: bool,
    issues: &mut Vec<RowIssue>,
) -> Result<Vec<InputWarehouseRow>, InputError> {
    let name_col = table.require_column(&columns.warehouse_name)?;
    let tier_col = table.require_column(&columns.tier)?;
    let quantity_col = table.column_index(&columns.stored_quantity);
    let longitude_col = table.column_index(&columns.longitude);
    let latitude_col = table.column_index(&columns.latitude);

    let mut rows = Vec::new();
    for (row_number, cells) in table.data_rows() {
        let mut r = RowReader {
            table,
            context: RowContext::Warehouse,
            row_number,
            cells,
            issues: &mut *issues,
        };
        let Some(name) = r.required_text(name_col) else {
            continue;
        };
        let tier_text = r.cell(tier_col).as_text().unwrap_or_default();
        let (tier, tier_source) = match tier_text.parse::<Tier>() {
            Ok(tier) => (tier, TierSource::Column),
            Err(_) if infer_tier_from_name => {
                (Tier::infer_from_name(&name), TierSource::InferredFromName)
            }
            Err(value) => {
                r.report(RowProblem::UnknownTier { value });
                continue;
            }
        };
        rows.push(InputWarehouseRow {
            row: row_number,
            name,
            tier,
            tier_source,
            quantity: r.optional_number(quantity_col),
            longitude: r.optional_number(longitude_col),
            latitude: r.optional_number(latitude_col),
        });
    }
    Ok(rows)
}

fn transport_rows(
    table: &Table,
    columns: &ColumnConfig,
    issues: &mut Vec<RowIssue>,
) -> Result<Vec<InputTransportRow>, InputError> {
    let from_col = table.require_column(&columns.edge_from)?;
    let to_col = table.require_column(&columns.edge_to)?;
    let time_col = table.column_index(&columns.transit_time);

    let mut rows = Vec::new();
    for (row_number, cells) in table.data_rows() {
        let mut r = RowReader {
            table,
            context: RowContext::Transport,
            row_number,
            cells,
            issues: &mut *issues,
        };
        let from = r.required_text(from_col);
        let to = r.required_text(to_col);
        let (Some(from_warehouse), Some(to_warehouse)) = (from, to) else {
            continue;
        };
        rows.push(InputTransportRow {
            row: row_number,
            from_warehouse,
            to_warehouse,
            transit_time: r.optional_number(time_col),
        });
    }
    Ok(rows)
}

fn demand_rows(
    table: &Table,
    columns: &ColumnConfig,
    issues: &mut Vec<RowIssue>,
) -> Result<Vec<InputDemandRow>, InputError> {
    let task_col = table.require_column(&columns.task_name)?;
    let user_col = table.require_column(&columns.user_warehouse)?;
    let quantity_col = table.column_index(&columns.demand_quantity);

    let mut rows = Vec::new();
    for (row_number, cells) in table.data_rows() {
        let mut r = RowReader {
            table,
            context: RowContext::Demand,
            row_number,
            cells,
            issues: &mut *issues,
        };
        let task = r.required_text(task_col);
        let user = r.required_text(user_col);
        let (Some(task_name), Some(user_warehouse)) = (task, user) else {
            continue;
        };
        rows.push(InputDemandRow {
            row: row_number,
            task_name,
            user_warehouse,
            quantity: r.optional_number(quantity_col),
        });
    }
    Ok(rows)
}
