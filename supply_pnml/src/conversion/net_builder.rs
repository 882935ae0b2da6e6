use std::{collections::HashMap, fmt::Display};

use serde::Serialize;

use crate::{
    conversion::{
        layout::{LayoutEngine, PositionMap},
        normalize::normalize_id_with,
        options::ConversionOptions,
    },
    error::{InputError, NetError},
    petri_net::petri_net_struct::{
        Arc, ArcType, Location, PetriNet, Place, PlaceID, Position, Transition, TransitionID,
    },
    supply_chain::tables::{
        InputDemandRow, InputTransportRow, InputWarehouseRow, RowProblem, SupplyChainRows,
        SupplyChainTables, Tier, TierSource,
    },
};

#[doc(inline)]
pub use crate::supply_chain::tables::RowContext;

///
/// Non-fatal problem found while building the net
///
/// The net is still complete; affected nodes use default coordinates or were skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostic {
    /// An edge or demand row names a warehouse missing from the node table
    UnresolvedWarehouse {
        /// Table of the referencing row
        context: RowContext,
        /// 1-based row number
        row: usize,
        /// Warehouse name as written
        name: String,
        /// Normalized id
        id: String,
    },
    /// A placeholder place was created for a missing warehouse
    PlaceholderPlace {
        /// Place id
        id: String,
        /// Warehouse name as written
        name: String,
    },
    /// An arc endpoint has no assigned position; (0,0) was used
    ArcEndpointUnpositioned {
        /// Arc id
        arc: String,
        /// Node id without position
        endpoint: String,
    },
    /// A row was skipped because the net rejected its node or arc (usually a duplicate id)
    Rejected {
        /// Table of the row
        context: RowContext,
        /// 1-based row number
        row: usize,
        /// Why the net rejected it
        error: NetError,
    },
    /// A row (or one of its cells) could not be used
    InvalidRow {
        /// Table of the row
        context: RowContext,
        /// 1-based row number
        row: usize,
        /// What was wrong
        problem: RowProblem,
    },
    /// A synthesized id was taken by a different node pair and got a hash suffix
    Renamed {
        /// Table of the row
        context: RowContext,
        /// 1-based row number
        row: usize,
        /// The id that was taken
        id: String,
        /// The id used instead
        renamed: String,
    },
    /// The tier of a warehouse was guessed from its name
    TierInferred {
        /// 1-based row number
        row: usize,
        /// Warehouse name
        name: String,
        /// Guessed tier
        tier: Tier,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnresolvedWarehouse {
                context,
                row,
                name,
                id,
            } => write!(
                f,
                "{context} row {row}: warehouse `{name}` ({id}) not found in node table, using default position"
            ),
            Diagnostic::PlaceholderPlace { id, name } => {
                write!(f, "created placeholder place `{id}` for unknown warehouse `{name}`")
            }
            Diagnostic::ArcEndpointUnpositioned { arc, endpoint } => {
                write!(f, "arc `{arc}`: endpoint `{endpoint}` has no position, using (0,0)")
            }
            Diagnostic::Rejected {
                context,
                row,
                error,
            } => write!(f, "{context} row {row} skipped: {error}"),
            Diagnostic::InvalidRow {
                context,
                row,
                problem,
            } => write!(f, "{context} row {row}: {problem}"),
            Diagnostic::Renamed {
                context,
                row,
                id,
                renamed,
            } => write!(f, "{context} row {row}: id `{id}` is taken, using `{renamed}`"),
            Diagnostic::TierInferred { row, name, tier } => {
                write!(f, "node table row {row}: tier of `{name}` guessed from its name as {tier}")
            }
        }
    }
}

///
/// Result of a conversion: the finished net and everything worth warning about
///
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The Petri net
    pub net: PetriNet,
    /// Non-fatal problems, in the order they were found
    pub diagnostics: Vec<Diagnostic>,
}

///
/// Builds a [`PetriNet`] from typed supply-chain rows in one pass per table
///
/// Order: warehouses → demand transitions → transport transitions and arcs → demand arcs.
#[derive(Debug)]
struct NetBuilder<'a> {
    options: &'a ConversionOptions,
    layout: LayoutEngine<'a>,
    positions: PositionMap,
    /// Transport transition id per (source, target) pair
    transports: HashMap<(String, String), String>,
    net: PetriNet,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> NetBuilder<'a> {
    fn new(options: &'a ConversionOptions) -> Self {
        Self {
            options,
            layout: LayoutEngine::new(&options.layout),
            positions: PositionMap::new(),
            transports: HashMap::new(),
            net: PetriNet::new(),
            diagnostics: Vec::new(),
        }
    }

    fn id(&self, label: &str) -> String {
        normalize_id_with(label, self.options.normalize)
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    fn reject(&mut self, context: RowContext, row: usize, error: NetError) {
        self.diagnose(Diagnostic::Rejected {
            context,
            row,
            error,
        });
    }

    fn add_warehouses(&mut self, rows: &[InputWarehouseRow]) {
        for row in rows {
            let id = self.id(&row.name);
            if row.tier_source == TierSource::InferredFromName {
                self.diagnose(Diagnostic::TierInferred {
                    row: row.row,
                    name: row.name.clone(),
                    tier: row.tier,
                });
            }
            // Check before layout so that skipped rows leave no gap in their tier
            if self.net.contains_node(&id) {
                self.reject(RowContext::Warehouse, row.row, NetError::DuplicateNode(id));
                continue;
            }
            let position = self.layout.place_warehouse(row.tier);
            let mut place = Place::new(PlaceID(id.clone()), row.name.clone(), position);
            place.initial_marking = row.quantity;
            place.location = Location::from_parts(row.longitude, row.latitude);
            place.tier = Some(row.tier);
            log::trace!("place `{id}` ({}) at {position}", row.tier);
            match self.net.add_place(place) {
                Ok(_) => self.positions.insert(id, position),
                Err(e) => self.reject(RowContext::Warehouse, row.row, e),
            }
        }
    }

    /// Returns the created transition per row (`None` for skipped rows)
    fn add_demand_transitions(&mut self, rows: &[InputDemandRow]) -> Vec<Option<TransitionID>> {
        rows.iter()
            .map(|row| {
                let id = self.id(&row.task_name);
                let user = self.id(&row.user_warehouse);
                let position = self.layout.demand_position(&self.positions, &user);
                let transition =
                    Transition::new(TransitionID(id.clone()), row.task_name.clone(), position);
                match self.net.add_transition(transition) {
                    Ok(tid) => {
                        log::trace!("demand transition `{id}` at {position}");
                        self.positions.insert(id, position);
                        Some(tid)
                    }
                    Err(e) => {
                        self.reject(RowContext::Demand, row.row, e);
                        None
                    }
                }
            })
            .collect()
    }

    fn add_transports(&mut self, rows: &[InputTransportRow]) {
        for row in rows {
            let source = self.id(&row.from_warehouse);
            let target = self.id(&row.to_warehouse);
            let pair = (source, target);
            if let Some(existing) = self.transports.get(&pair) {
                let error = NetError::DuplicateNode(existing.clone());
                self.reject(RowContext::Transport, row.row, error);
                continue;
            }
            let (source, target) = (pair.0.as_str(), pair.1.as_str());
            let naming = &self.options.naming;
            let label = naming.transport_label(&row.from_warehouse, &row.to_warehouse);
            let id = naming.transport_id(source, target);
            let taken = self.net.contains_node(&id);
            let id = self.unambiguous(id, taken, (source, target), (RowContext::Transport, row.row));

            let position = self.layout.transport_position(&self.positions, source, target);
            let transition = Transition::new(TransitionID(id.clone()), label, position);
            let tid = match self.net.add_transition(transition) {
                Ok(tid) => tid,
                Err(e) => {
                    self.reject(RowContext::Transport, row.row, e);
                    continue;
                }
            };
            log::trace!("transport transition `{id}` at {position}");
            self.positions.insert(id.clone(), position);
            self.transports.insert(pair, id);

            let from = self.resolve_place(RowContext::Transport, row.row, &row.from_warehouse);
            let to = self.resolve_place(RowContext::Transport, row.row, &row.to_warehouse);
            if let Some(from) = from {
                self.connect(
                    ArcType::place_to_transition(from, tid.clone()),
                    None,
                    RowContext::Transport,
                    row.row,
                );
            }
            if let Some(to) = to {
                self.connect(
                    ArcType::transition_to_place(tid, to),
                    row.transit_time,
                    RowContext::Transport,
                    row.row,
                );
            }
        }
    }

    fn add_demand_arcs(&mut self, rows: &[InputDemandRow], transitions: Vec<Option<TransitionID>>) {
        for (row, tid) in rows.iter().zip(transitions) {
            let Some(tid) = tid else {
                continue;
            };
            if let Some(user) = self.resolve_place(RowContext::Demand, row.row, &row.user_warehouse)
            {
                self.connect(
                    ArcType::transition_to_place(tid, user),
                    row.quantity,
                    RowContext::Demand,
                    row.row,
                );
            }
        }
    }

    /// The place for a warehouse name referenced by an edge or demand row
    ///
    /// Names missing from the node table are reported and get a placeholder place at
    /// (0,0), created on first use.
    fn resolve_place(&mut self, context: RowContext, row: usize, name: &str) -> Option<PlaceID> {
        let id = self.id(name);
        let existing = self.net.place(&id).map(Place::is_placeholder);
        if existing == Some(false) {
            return Some(PlaceID(id));
        }
        self.diagnose(Diagnostic::UnresolvedWarehouse {
            context,
            row,
            name: name.to_string(),
            id: id.clone(),
        });
        if existing == Some(true) {
            return Some(PlaceID(id));
        }
        match self
            .net
            .add_place(Place::new(PlaceID(id.clone()), name, Position::ORIGIN))
        {
            Ok(pid) => {
                self.diagnose(Diagnostic::PlaceholderPlace {
                    id,
                    name: name.to_string(),
                });
                Some(pid)
            }
            Err(e) => {
                self.reject(context, row, e);
                None
            }
        }
    }

    /// `id` itself, or its [`disambiguated`](crate::conversion::options::NamingConfig::disambiguate)
    /// variant if `taken`
    fn unambiguous(
        &mut self,
        id: String,
        taken: bool,
        (source, target): (&str, &str),
        (context, row): (RowContext, usize),
    ) -> String {
        if !taken {
            return id;
        }
        let renamed = self.options.naming.disambiguate(&id, source, target);
        self.diagnose(Diagnostic::Renamed {
            context,
            row,
            id,
            renamed: renamed.clone(),
        });
        renamed
    }

    fn endpoint_position(&mut self, arc: &str, endpoint: &str) -> Position {
        match self.positions.get(endpoint) {
            Some(position) => position,
            None => {
                self.diagnose(Diagnostic::ArcEndpointUnpositioned {
                    arc: arc.to_string(),
                    endpoint: endpoint.to_string(),
                });
                Position::ORIGIN
            }
        }
    }

    fn connect(
        &mut self,
        from_to: ArcType,
        inscription: Option<f64>,
        context: RowContext,
        row: usize,
    ) {
        let id = self.options.naming.arc_id(from_to.source(), from_to.target());
        let taken = self.net.arcs.contains_key(&id);
        let id = self.unambiguous(
            id,
            taken,
            (from_to.source(), from_to.target()),
            (context, row),
        );
        let graphics = [
            self.endpoint_position(&id, from_to.source()),
            self.endpoint_position(&id, from_to.target()),
        ];
        let arc = Arc {
            id,
            from_to,
            inscription,
            graphics,
        };
        if let Err(e) = self.net.add_arc(arc) {
            self.reject(context, row, e);
        }
    }

    fn finish(self) -> Conversion {
        log::info!(
            "built Petri net: {} places, {} transitions, {} arcs, {} warnings",
            self.net.places.len(),
            self.net.transitions.len(),
            self.net.arcs.len(),
            self.diagnostics.len()
        );
        Conversion {
            net: self.net,
            diagnostics: self.diagnostics,
        }
    }
}

///
/// Build the Petri net for typed supply-chain rows
///
/// Never fails: row issues, unresolved references and duplicates end up in
/// [`Conversion::diagnostics`].
pub fn build_petri_net(rows: &SupplyChainRows, options: &ConversionOptions) -> Conversion {
    let mut builder = NetBuilder::new(options);
    for issue in &rows.issues {
        builder.diagnose(Diagnostic::InvalidRow {
            context: issue.context,
            row: issue.row,
            problem: issue.problem.clone(),
        });
    }
    builder.add_warehouses(&rows.warehouses);
    let demand_transitions = builder.add_demand_transitions(&rows.demands);
    builder.add_transports(&rows.transports);
    builder.add_demand_arcs(&rows.demands, demand_transitions);
    builder.finish()
}

///
/// Map raw input tables to rows and build the Petri net
///
/// Fails only if a table lacks a required column (see [`SupplyChainTables::to_rows`]).
/// Problems with single rows become [`Diagnostic::InvalidRow`]s.
pub fn convert_tables(
    tables: &SupplyChainTables,
    options: &ConversionOptions,
) -> Result<Conversion, InputError> {
    let rows = tables.to_rows(&options.columns, options.infer_tier_from_name)?;
    log::debug!(
        "{} warehouse rows, {} transport rows, {} demand rows",
        rows.warehouses.len(),
        rows.transports.len(),
        rows.demands.len()
    );
    Ok(build_petri_net(&rows, options))
}
