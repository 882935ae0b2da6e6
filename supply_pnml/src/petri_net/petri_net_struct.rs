use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::NetError;
use crate::supply_chain::tables::{format_number, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Drawing position of a node (in editor units)
pub struct Position {
    /// Horizontal coordinate
    pub x: i64,
    /// Vertical coordinate
    pub y: i64,
}

impl Position {
    /// The origin, used whenever no better position is known
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    /// Create a new [`Position`]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// Geographic location of a warehouse
///
/// At least one of the two coordinates is set when attached to a [`Place`].
pub struct Location {
    /// Longitude
    pub longitude: Option<f64>,
    /// Latitude
    pub latitude: Option<f64>,
}

impl Location {
    /// Build a location if at least one coordinate is present
    pub fn from_parts(longitude: Option<f64>, latitude: Option<f64>) -> Option<Self> {
        if longitude.is_some() || latitude.is_some() {
            Some(Self {
                longitude,
                latitude,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Place in a Petri net (a warehouse or user)
pub struct Place {
    id: PlaceID,
    /// Human-readable label (the original warehouse name)
    pub label: String,
    /// Initial marking (stored quantity), if any
    pub initial_marking: Option<f64>,
    /// Drawing position
    pub position: Position,
    /// Longitude/latitude attribute, if any
    pub location: Option<Location>,
    /// Tier the place was laid out in (`None` for placeholder places)
    pub tier: Option<Tier>,
}

impl Place {
    /// Create a new place
    pub fn new(id: PlaceID, label: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            label: label.into(),
            initial_marking: None,
            position,
            location: None,
            tier: None,
        }
    }

    /// Id of this place
    pub fn id(&self) -> &PlaceID {
        &self.id
    }

    /// Initial marking rendered as PNML text (e.g., `50`, not `50.0`)
    pub fn marking_text(&self) -> Option<String> {
        self.initial_marking.map(format_number)
    }

    /// Whether this place was synthesized for a name missing from the node table
    pub fn is_placeholder(&self) -> bool {
        self.tier.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Transition in a Petri net (a transport move or a demand task)
pub struct Transition {
    id: TransitionID,
    /// Transition label
    pub label: String,
    /// Drawing position
    pub position: Position,
}

impl Transition {
    /// Create a new transition
    pub fn new(id: TransitionID, label: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            label: label.into(),
            position,
        }
    }

    /// Id of this transition
    pub fn id(&self) -> &TransitionID {
        &self.id
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Hash, PartialEq, Eq)]
#[serde(tag = "type", content = "nodes")]
/// Arc type in a Petri net
///
/// Place→place and transition→transition arcs cannot be expressed.
pub enum ArcType {
    /// From Place to Transition
    PlaceTransition(PlaceID, TransitionID),
    /// From Transition to Place
    TransitionPlace(TransitionID, PlaceID),
}

impl ArcType {
    /// Create new from place to transition
    pub fn place_to_transition(from: PlaceID, to: TransitionID) -> ArcType {
        ArcType::PlaceTransition(from, to)
    }
    /// Create new from transition to place
    pub fn transition_to_place(from: TransitionID, to: PlaceID) -> ArcType {
        ArcType::TransitionPlace(from, to)
    }
    /// Raw id of the source node
    pub fn source(&self) -> &str {
        match self {
            ArcType::PlaceTransition(from, _) => from.as_str(),
            ArcType::TransitionPlace(from, _) => from.as_str(),
        }
    }
    /// Raw id of the target node
    pub fn target(&self) -> &str {
        match self {
            ArcType::PlaceTransition(_, to) => to.as_str(),
            ArcType::TransitionPlace(_, to) => to.as_str(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
/// Arc in a Petri net
///
/// Connecting a transition and a place (or the other way around)
pub struct Arc {
    /// Arc id
    pub id: String,
    /// Source and target of Arc
    pub from_to: ArcType,
    /// Inscription (transit time or demanded quantity), if any
    pub inscription: Option<f64>,
    /// Drawing positions of source and target endpoint
    pub graphics: [Position; 2],
}

impl Arc {
    /// Inscription rendered as PNML text
    pub fn inscription_text(&self) -> Option<String> {
        self.inscription.map(format_number)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Hash, Eq, PartialOrd, Ord)]
/// Place ID
pub struct PlaceID(pub String);
impl PlaceID {
    /// Get the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl Display for PlaceID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Hash, Eq, PartialOrd, Ord)]
/// Transition ID
pub struct TransitionID(pub String);
impl TransitionID {
    /// Get the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl Display for TransitionID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
///
/// A Petri net of [`Place`]s and [`Transition`]s
///
/// Bipartite graph of [`Place`]s and [`Transition`]s with [`Arc`]s connecting them.
/// Node ids are unique across places and transitions together; iteration order is insertion order.
pub struct PetriNet {
    /// Places
    pub places: IndexMap<String, Place>,
    /// Transitions
    pub transitions: IndexMap<String, Transition>,
    /// Arcs
    pub arcs: IndexMap<String, Arc>,
}

impl PetriNet {
    /// Create new [`PetriNet`] with no places or transitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Is the id taken by a place or a transition?
    pub fn contains_node(&self, id: &str) -> bool {
        self.places.contains_key(id) || self.transitions.contains_key(id)
    }

    /// Add a place
    ///
    /// Fails if a place or transition with the same id exists already
    pub fn add_place(&mut self, place: Place) -> Result<PlaceID, NetError> {
        let id = place.id.clone();
        if self.contains_node(id.as_str()) {
            return Err(NetError::DuplicateNode(id.0));
        }
        self.places.insert(id.0.clone(), place);
        Ok(id)
    }

    /// Add a transition
    ///
    /// Fails if a place or transition with the same id exists already
    pub fn add_transition(&mut self, transition: Transition) -> Result<TransitionID, NetError> {
        let id = transition.id.clone();
        if self.contains_node(id.as_str()) {
            return Err(NetError::DuplicateNode(id.0));
        }
        self.transitions.insert(id.0.clone(), transition);
        Ok(id)
    }

    /// Add an arc
    ///
    /// Both endpoints must already be part of the net.
    pub fn add_arc(&mut self, arc: Arc) -> Result<(), NetError> {
        if self.arcs.contains_key(&arc.id) {
            return Err(NetError::DuplicateArc(arc.id));
        }
        let (place, transition) = match &arc.from_to {
            ArcType::PlaceTransition(p, t) => (p, t),
            ArcType::TransitionPlace(t, p) => (p, t),
        };
        let missing = if !self.places.contains_key(place.as_str()) {
            Some(place.to_string())
        } else if !self.transitions.contains_key(transition.as_str()) {
            Some(transition.to_string())
        } else {
            None
        };
        if let Some(node) = missing {
            return Err(NetError::UnknownEndpoint { arc: arc.id, node });
        }
        self.arcs.insert(arc.id.clone(), arc);
        Ok(())
    }

    /// Look up a place
    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.get(id)
    }

    /// Look up a transition
    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.transitions.get(id)
    }

    /// Get the preset of a [`PetriNet`] place
    pub fn preset_of_place(&self, p: &PlaceID) -> Vec<TransitionID> {
        self.arcs
            .values()
            .filter_map(|x: &Arc| match &x.from_to {
                ArcType::TransitionPlace(from, to) if to == p => Some(from.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get the preset of [`PetriNet`] transition
    pub fn preset_of_transition(&self, t: &TransitionID) -> Vec<PlaceID> {
        self.arcs
            .values()
            .filter_map(|x: &Arc| match &x.from_to {
                ArcType::PlaceTransition(from, to) if to == t => Some(from.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] place
    pub fn postset_of_place(&self, p: &PlaceID) -> Vec<TransitionID> {
        self.arcs
            .values()
            .filter_map(|x: &Arc| match &x.from_to {
                ArcType::PlaceTransition(from, to) if from == p => Some(to.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] transition
    pub fn postset_of_transition(&self, t: &TransitionID) -> Vec<PlaceID> {
        self.arcs
            .values()
            .filter_map(|x: &Arc| match &x.from_to {
                ArcType::TransitionPlace(from, to) if from == t => Some(to.clone()),
                _ => None,
            })
            .collect()
    }

    /// Check the structural invariants of the net
    ///
    /// Returns one message per violation: arcs pointing at missing nodes, and ids used
    /// both as a place and a transition. An empty result means the net is well-formed.
    pub fn validate(&self) -> Vec<String> {
        let mut problems: Vec<String> = self
            .places
            .keys()
            .filter(|id| self.transitions.contains_key(*id))
            .map(|id| format!("id `{id}` is used by a place and a transition"))
            .collect();
        for arc in self.arcs.values() {
            let (place, transition) = match &arc.from_to {
                ArcType::PlaceTransition(p, t) => (p, t),
                ArcType::TransitionPlace(t, p) => (p, t),
            };
            if !self.places.contains_key(place.as_str()) {
                problems.push(format!("arc `{}` references unknown place `{place}`", arc.id));
            }
            if !self.transitions.contains_key(transition.as_str()) {
                problems.push(format!(
                    "arc `{}` references unknown transition `{transition}`",
                    arc.id
                ));
            }
        }
        problems
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
