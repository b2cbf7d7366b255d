//! Netzwerk-Topologie, wie der Host-Simulator sie liefert.
//!
//! Die Engine liest diese Daten nur. Der einbettende Host (oder ein
//! Test-Fixture) besitzt und pflegt sie; alle Geometrie-Funktionen bekommen
//! das Netzwerk als Referenz hereingereicht.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Art eines Segments — steuert Markierungs- und Twist-Verhalten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SegmentKind {
    #[default]
    Road,
    Path,
    Track,
    /// Schmale Zier-Anbauten (eigenständiges Twist-Verhalten unter Custom).
    Decoration,
}

/// Ein Straßensegment zwischen zwei Knoten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentTopology {
    pub id: u64,
    pub start_node: u64,
    pub end_node: u64,
    /// Tangente am Startknoten, zeigt ins Segment hinein.
    pub start_direction: Vec3,
    /// Tangente am Endknoten, zeigt ins Segment hinein.
    pub end_direction: Vec3,
    pub half_width: f32,
    #[serde(default)]
    pub kind: SegmentKind,
    /// Vom Host gesperrt (z.B. durch Assets erzeugte Segmente).
    #[serde(default)]
    pub untouchable: bool,
}

/// Ein Knoten, an dem Segmente zusammenlaufen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JunctionTopology {
    pub id: u64,
    pub position: Vec3,
    #[serde(default)]
    pub segment_ids: Vec<u64>,
    /// Vom Host als unantastbar markiert — die Engine legt hier keine
    /// Kreuzungsdaten an.
    #[serde(default)]
    pub untouchable: bool,
}

/// Container für die gesamte Topologie.
#[derive(Debug, Clone, Default)]
pub struct Network {
    segments: HashMap<u64, SegmentTopology>,
    junctions: HashMap<u64, JunctionTopology>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt einen Knoten hinzu (ersetzt einen vorhandenen mit gleicher ID).
    pub fn add_junction(&mut self, junction: JunctionTopology) {
        self.junctions.insert(junction.id, junction);
    }

    /// Fügt ein Segment hinzu und trägt es bei beiden Endknoten ein.
    pub fn add_segment(&mut self, segment: SegmentTopology) {
        for node_id in [segment.start_node, segment.end_node] {
            match self.junctions.get_mut(&node_id) {
                Some(junction) => {
                    if !junction.segment_ids.contains(&segment.id) {
                        junction.segment_ids.push(segment.id);
                    }
                }
                None => {
                    log::warn!(
                        "Segment {} referenziert unbekannten Knoten {}",
                        segment.id,
                        node_id
                    );
                }
            }
        }
        self.segments.insert(segment.id, segment);
    }

    /// Entfernt ein Segment samt Einträgen an den Endknoten.
    pub fn remove_segment(&mut self, segment_id: u64) {
        let Some(segment) = self.segments.remove(&segment_id) else {
            return;
        };
        for node_id in [segment.start_node, segment.end_node] {
            if let Some(junction) = self.junctions.get_mut(&node_id) {
                junction.segment_ids.retain(|&id| id != segment_id);
            }
        }
    }

    pub fn segment(&self, segment_id: u64) -> Option<&SegmentTopology> {
        self.segments.get(&segment_id)
    }

    pub fn junction(&self, node_id: u64) -> Option<&JunctionTopology> {
        self.junctions.get(&node_id)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    /// Liegt `node_id` am Startende von `segment_id`?
    pub fn is_start_node(&self, segment_id: u64, node_id: u64) -> Option<bool> {
        let segment = self.segments.get(&segment_id)?;
        if segment.start_node == node_id {
            Some(true)
        } else if segment.end_node == node_id {
            Some(false)
        } else {
            None
        }
    }

    /// Der Knoten am anderen Ende des Segments.
    pub fn other_node(&self, segment_id: u64, node_id: u64) -> Option<u64> {
        let segment = self.segments.get(&segment_id)?;
        if segment.start_node == node_id {
            Some(segment.end_node)
        } else if segment.end_node == node_id {
            Some(segment.start_node)
        } else {
            None
        }
    }

    /// Tangente des Segments am angegebenen Knoten (zeigt ins Segment).
    pub fn direction_at(&self, segment_id: u64, node_id: u64) -> Option<Vec3> {
        let segment = self.segments.get(&segment_id)?;
        if segment.start_node == node_id {
            Some(segment.start_direction)
        } else if segment.end_node == node_id {
            Some(segment.end_direction)
        } else {
            None
        }
    }

    /// IDs aller Segmente am Knoten (leer, wenn der Knoten fehlt).
    pub fn attached_segments(&self, node_id: u64) -> &[u64] {
        self.junctions
            .get(&node_id)
            .map(|junction| junction.segment_ids.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knoten(id: u64, x: f32, z: f32) -> JunctionTopology {
        JunctionTopology {
            id,
            position: Vec3::new(x, 0.0, z),
            segment_ids: Vec::new(),
            untouchable: false,
        }
    }

    fn segment(id: u64, start: u64, end: u64) -> SegmentTopology {
        SegmentTopology {
            id,
            start_node: start,
            end_node: end,
            start_direction: Vec3::X,
            end_direction: -Vec3::X,
            half_width: 4.0,
            kind: SegmentKind::Road,
            untouchable: false,
        }
    }

    #[test]
    fn test_add_segment_pflegt_knotenliste() {
        let mut net = Network::new();
        net.add_junction(knoten(1, 0.0, 0.0));
        net.add_junction(knoten(2, 100.0, 0.0));
        net.add_segment(segment(10, 1, 2));

        assert_eq!(net.attached_segments(1), &[10]);
        assert_eq!(net.attached_segments(2), &[10]);

        net.remove_segment(10);
        assert!(net.attached_segments(1).is_empty());
        assert!(net.segment(10).is_none());
    }

    #[test]
    fn test_richtung_und_gegenknoten() {
        let mut net = Network::new();
        net.add_junction(knoten(1, 0.0, 0.0));
        net.add_junction(knoten(2, 100.0, 0.0));
        net.add_segment(segment(10, 1, 2));

        assert_eq!(net.other_node(10, 1), Some(2));
        assert_eq!(net.other_node(10, 2), Some(1));
        assert_eq!(net.other_node(10, 3), None);
        assert_eq!(net.is_start_node(10, 1), Some(true));
        assert_eq!(net.is_start_node(10, 2), Some(false));
        assert_eq!(net.direction_at(10, 2), Some(-Vec3::X));
    }

    #[test]
    fn test_doppeltes_add_segment_dupliziert_nicht() {
        let mut net = Network::new();
        net.add_junction(knoten(1, 0.0, 0.0));
        net.add_junction(knoten(2, 100.0, 0.0));
        net.add_segment(segment(10, 1, 2));
        net.add_segment(segment(10, 1, 2));
        assert_eq!(net.attached_segments(1), &[10]);
    }
}
