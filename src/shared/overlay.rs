//! Render-neutrale Overlay-Beschreibungen.
//!
//! Die Engine erzeugt keine Pixel: sie liefert Kurvenstücke mit Farbe und
//! Schnittkanten-Flags, aus denen ein Renderer die Kreuzungs-Hilfslinien
//! zeichnen kann.

use glam::Vec4;

use crate::geometry::Bezier3;

/// Darstellung eines Overlay-Kurvenstücks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// RGBA, linear.
    pub color: Vec4,
    /// Anfang senkrecht abschneiden statt rund auslaufen lassen.
    pub cut_start: bool,
    /// Ende senkrecht abschneiden.
    pub cut_end: bool,
}

impl OverlayStyle {
    pub const fn new(color: Vec4) -> Self {
        Self {
            color,
            cut_start: false,
            cut_end: false,
        }
    }

    pub const fn with_cuts(color: Vec4, cut_start: bool, cut_end: bool) -> Self {
        Self {
            color,
            cut_start,
            cut_end,
        }
    }

    /// Grün: verschiebbarer Bereich einer Randkurve.
    pub const ALLOWED: OverlayStyle = OverlayStyle::new(Vec4::new(0.2, 0.8, 0.2, 0.8));
    /// Rot: gesperrter Bereich unterhalb des Minimal-Limits.
    pub const FORBIDDEN: OverlayStyle = OverlayStyle::new(Vec4::new(0.85, 0.15, 0.15, 0.8));
    /// Weiß: Kontur eines Segmentendes.
    pub const CONTOUR: OverlayStyle = OverlayStyle::new(Vec4::new(1.0, 1.0, 1.0, 0.9));
}

/// Ein fertig zugeschnittenes Kurvenstück samt Stil.
#[derive(Debug, Clone, Copy)]
pub struct OverlayCurve {
    pub curve: Bezier3,
    pub style: OverlayStyle,
}

impl OverlayCurve {
    pub fn new(curve: Bezier3, style: OverlayStyle) -> Self {
        Self { curve, style }
    }
}
