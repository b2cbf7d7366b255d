//! Kurven- und Schnittpunkt-Primitive der Geometrie-Engine.

pub mod intersection;
pub mod trajectory;
pub mod vector;

pub use intersection::{bezier_bezier, bezier_line, line_line, Hit};
pub use trajectory::{Bezier3, StraightLine};
