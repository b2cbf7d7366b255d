//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält Typen, die zwischen Engine-Kern und Host-Anwendung geteilt
//! werden, um direkte Abhängigkeiten zu vermeiden.

pub mod options;
pub mod overlay;

pub use options::EngineOptions;
pub use overlay::{OverlayCurve, OverlayStyle};
