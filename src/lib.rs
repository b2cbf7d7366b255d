//! Geometrie-Engine für Straßenkreuzungen.
//! Berechnet aus einer Netzwerk-Topologie die Randkurven, legalen
//! Parameterfenster und Eckpunkte aller Segmentenden einer Kreuzung.

pub mod core;
pub mod geometry;
pub mod shared;
pub mod xml;

pub use core::{
    available_styles, default_style, JunctionData, JunctionManager, JunctionTopology, MainRoad,
    Network, NodeStyleType, SegmentEndData, SegmentKind, SegmentSide, SegmentTopology, SideType,
    StylePolicy,
};
pub use geometry::{Bezier3, StraightLine};
pub use shared::{EngineOptions, OverlayCurve, OverlayStyle};
pub use xml::{
    apply_config, parse_junction_config, snapshot_manager, write_junction_config, JunctionConfig,
};
