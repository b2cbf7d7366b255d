//! Kern der Kreuzungs-Engine: Netzwerk-Topologie, Archetypen mit ihren
//! Parameter-Richtlinien, Segmentenden samt Randkurven und der Manager
//! mit der netzweiten Auflösungs-Pipeline.

pub mod junction;
pub mod manager;
pub mod network;
pub mod segment_end;
pub mod segment_side;
pub mod style;

pub use junction::{JunctionData, MainRoad};
pub use manager::JunctionManager;
pub use network::{JunctionTopology, Network, SegmentKind, SegmentTopology};
pub use segment_end::{
    compute_segment_curves, EndContext, EndInfluence, SegmentCurves, SegmentEndData,
};
pub use segment_side::{MainCurves, SegmentSide, SideType};
pub use style::{
    available_styles, default_style, NodeStyleType, StylePolicy, SupportOption, TwistCoupling,
};
