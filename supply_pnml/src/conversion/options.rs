use serde::{Deserialize, Serialize};

use crate::{
    conversion::{
        layout::LayoutConfig,
        normalize::{short_hash, NormalizePolicy},
    },
    petri_net::export_pnml::PnmlOptions,
    supply_chain::tables::ColumnConfig,
};

///
/// Prefixes used for synthesized ids and labels
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Transport transition ids are `<prefix>_<source>_<target>`
    pub transport_id_prefix: String,
    /// Transport transition labels are `<prefix>_<source name>_<target name>`
    pub transport_label_prefix: String,
    /// Arc ids are `<prefix>_<source>_<target>`
    pub arc_id_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            transport_id_prefix: "trans".into(),
            transport_label_prefix: "运输".into(),
            arc_id_prefix: "arc".into(),
        }
    }
}

impl NamingConfig {
    /// Id of the transition synthesized for a transport edge
    pub fn transport_id(&self, source: &str, target: &str) -> String {
        format!("{}_{source}_{target}", self.transport_id_prefix)
    }
    /// Label of the transition synthesized for a transport edge
    pub fn transport_label(&self, source_name: &str, target_name: &str) -> String {
        format!(
            "{}_{source_name}_{target_name}",
            self.transport_label_prefix
        )
    }
    /// Id of an arc between two nodes
    pub fn arc_id(&self, source: &str, target: &str) -> String {
        format!("{}_{source}_{target}", self.arc_id_prefix)
    }
    /// Variant of a synthesized `id` for when it is taken by another `source`/`target` pair
    ///
    /// Underscores inside node ids make `<prefix>_<source>_<target>` ambiguous
    /// (`a_b`→`c` and `a`→`b_c`); the suffix hashes the pair with a separator node ids
    /// never contain.
    pub fn disambiguate(&self, id: &str, source: &str, target: &str) -> String {
        format!("{id}_{}", short_hash(&format!("{source}->{target}")))
    }
}

///
/// Options for converting supply-chain tables into a Petri net
///
/// All fields have defaults matching the reference workbook layout, so a partial JSON
/// document is enough to override single settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Layout constants
    pub layout: LayoutConfig,
    /// Sheet names and column headers
    pub columns: ColumnConfig,
    /// Id and label prefixes
    pub naming: NamingConfig,
    /// Identifier normalization policy
    pub normalize: NormalizePolicy,
    /// Derive missing or unknown tiers from warehouse names (legacy heuristic)
    pub infer_tier_from_name: bool,
    /// PNML output settings
    pub pnml: PnmlOptions,
}

impl ConversionOptions {
    /// Parse options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON of these options
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
