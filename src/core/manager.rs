//! Verwaltung aller kontrollierten Kreuzungen über dem Host-Netzwerk.
//!
//! Der Manager besitzt die [`JunctionData`]-Objekte, sammelt geänderte
//! Kreuzungen in einer Warteschlange und löst sie gesammelt pro
//! Simulationsschritt auf. Die Reihenfolge ist fest: erst die Segmentkurven
//! (Shift-Kopplung wirkt über beide Enden), dann alle Min-Limits, dann die
//! segmentweisen Max-Limits, zuletzt die Eckpunkte. Max-Limits lesen die
//! Eckparameter beider Segmentenden und dürfen deshalb erst nach sämtlichen
//! Min-Limits laufen.

use glam::Vec3;
use indexmap::{IndexMap, IndexSet};

use crate::core::junction::{JunctionData, NEAR_OPPOSITE_DOT};
use crate::core::network::Network;
use crate::core::segment_end::{
    calculate_max_limits, compute_segment_curves, corner_parameters, EndInfluence, SegmentEndData,
};
use crate::core::style::{available_styles, default_style, NodeStyleType};
use crate::geometry::vector::flat_normalized;
use crate::shared::options::EngineOptions;

#[derive(Debug, Default)]
pub struct JunctionManager {
    junctions: IndexMap<u64, JunctionData>,
    /// Kreuzungen mit ausstehender Neuberechnung, in Meldungsreihenfolge.
    dirty: IndexSet<u64>,
    pub options: EngineOptions,
}

impl JunctionManager {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            junctions: IndexMap::new(),
            dirty: IndexSet::new(),
            options,
        }
    }

    pub fn junction(&self, node_id: u64) -> Option<&JunctionData> {
        self.junctions.get(&node_id)
    }

    /// Mutabler Zugriff; die Kreuzung landet dabei in der Warteschlange,
    /// weil jeder Schreibzugriff eine Neuberechnung nach sich zieht.
    pub fn junction_mut(&mut self, node_id: u64) -> Option<&mut JunctionData> {
        if self.junctions.contains_key(&node_id) {
            self.dirty.insert(node_id);
        }
        self.junctions.get_mut(&node_id)
    }

    pub fn junctions(&self) -> impl Iterator<Item = &JunctionData> {
        self.junctions.values()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn has_pending_updates(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Legt Kreuzungsdaten für einen Knoten an, falls noch keine existieren.
    /// Der Archetyp folgt der Topologie: zwei fast gegenläufige Segmente
    /// ergeben eine durchgehende Straße, sonst gilt der Zahl nach der
    /// passende Standard. Unantastbare Knoten bleiben unverwaltet.
    pub fn ensure_junction(&mut self, network: &Network, node_id: u64) -> bool {
        if self.junctions.contains_key(&node_id) {
            return false;
        }
        let Some(topology) = network.junction(node_id) else {
            return false;
        };
        if topology.untouchable {
            return false;
        }

        let mut junction = JunctionData::new(node_id, topology.position, NodeStyleType::End);
        for &segment_id in network.attached_segments(node_id) {
            if let Some(segment) = network.segment(segment_id) {
                junction.add_end(SegmentEndData::new(segment, node_id));
            }
        }
        let style = default_style(junction.end_count(), self.near_opposite(network, node_id));
        junction.set_style(style, self.options.node_is_sloped_by_default);

        self.junctions.insert(node_id, junction);
        self.dirty.insert(node_id);
        true
    }

    /// Entfernt die Kreuzungsdaten eines Knotens; Nachbarn über die
    /// angeschlossenen Segmente werden zur Neuberechnung vorgemerkt.
    pub fn remove_junction(&mut self, network: &Network, node_id: u64) -> bool {
        let Some(junction) = self.junctions.shift_remove(&node_id) else {
            return false;
        };
        self.dirty.shift_remove(&node_id);
        for end in junction.ends() {
            if let Some(other) = network.other_node(end.segment_id, node_id) {
                if self.junctions.contains_key(&other) {
                    self.dirty.insert(other);
                }
            }
        }
        true
    }

    /// Wechselt den Archetyp einer Kreuzung und setzt alle Enden auf dessen
    /// Vorgaben zurück; unzulässige Archetypen werden abgewiesen.
    pub fn set_style(&mut self, node_id: u64, style: NodeStyleType) -> bool {
        let default_is_slope = self.options.node_is_sloped_by_default;
        let Some(junction) = self.junctions.get_mut(&node_id) else {
            return false;
        };
        if !junction.set_style(style, default_is_slope) {
            return false;
        }
        self.dirty.insert(node_id);
        true
    }

    /// Ein neues Segment ist im Netzwerk aufgetaucht: beide verwalteten
    /// Endknoten erhalten ein frisches Ende mit Archetyp-Vorgaben; wird der
    /// bisherige Archetyp durch die neue Segmentzahl unzulässig, springt die
    /// Kreuzung auf den Topologie-Standard.
    pub fn segment_added(&mut self, network: &Network, segment_id: u64) {
        let Some(segment) = network.segment(segment_id) else {
            return;
        };
        let default_is_slope = self.options.node_is_sloped_by_default;

        for node_id in [segment.start_node, segment.end_node] {
            let near_opposite = self.near_opposite(network, node_id);
            let Some(junction) = self.junctions.get_mut(&node_id) else {
                continue;
            };
            if junction.end(segment_id).is_none() {
                junction.add_end(SegmentEndData::new(segment, node_id));
            }
            if !available_styles(junction.end_count()).contains(&junction.style) {
                junction.set_style(
                    default_style(junction.end_count(), near_opposite),
                    default_is_slope,
                );
            } else {
                let policy = junction.style.policy();
                if let Some(end) = junction.end_mut(segment_id) {
                    end.reset_to_default(policy, default_is_slope, true);
                }
            }
            self.dirty.insert(node_id);
        }
    }

    /// Ein Segment ist aus dem Netzwerk verschwunden. Kreuzungen ohne
    /// verbleibende Enden werden aufgegeben, die übrigen bei Bedarf auf
    /// einen zulässigen Archetyp umgestellt.
    pub fn segment_removed(&mut self, network: &Network, segment_id: u64) {
        let affected: Vec<u64> = self
            .junctions
            .iter()
            .filter_map(|(&node_id, junction)| junction.end(segment_id).map(|_| node_id))
            .collect();
        let default_is_slope = self.options.node_is_sloped_by_default;

        for node_id in affected {
            let near_opposite = self.near_opposite(network, node_id);
            let mut empty = false;
            if let Some(junction) = self.junctions.get_mut(&node_id) {
                junction.remove_end(segment_id);
                if junction.end_count() == 0 {
                    empty = true;
                } else if !available_styles(junction.end_count()).contains(&junction.style) {
                    junction.set_style(
                        default_style(junction.end_count(), near_opposite),
                        default_is_slope,
                    );
                }
            }
            if empty {
                self.junctions.shift_remove(&node_id);
                self.dirty.shift_remove(&node_id);
            } else {
                self.dirty.insert(node_id);
            }
        }
    }

    /// Arbeitet die Warteschlange ab. Nachbarn über gemeinsame Segmente
    /// rechnen mit, weil Shift-Kopplung und Max-Limits beide Enden lesen.
    pub fn process_updates(&mut self, network: &Network) {
        if self.dirty.is_empty() {
            return;
        }

        let mut pending: IndexSet<u64> = IndexSet::new();
        let mut segments: IndexSet<u64> = IndexSet::new();
        for &node_id in &self.dirty {
            if !self.junctions.contains_key(&node_id) {
                continue;
            }
            pending.insert(node_id);
            for &segment_id in network.attached_segments(node_id) {
                segments.insert(segment_id);
                if let Some(other) = network.other_node(segment_id, node_id) {
                    if self.junctions.contains_key(&other) {
                        pending.insert(other);
                    }
                }
            }
        }
        self.dirty.clear();

        for &node_id in &pending {
            if let Some(topology) = network.junction(node_id) {
                if let Some(junction) = self.junctions.get_mut(&node_id) {
                    junction.position = topology.position;
                }
            }
        }

        // Segmentkurven als atomare Einheit: beide Enden bekommen dieselben
        // frisch gerechneten Beziers, bevor irgendein Ende auflöst.
        for &segment_id in &segments {
            self.refresh_segment_curves(network, segment_id);
        }

        for &node_id in &pending {
            if let Some(junction) = self.junctions.get_mut(&node_id) {
                junction.calculate_min_limits();
            }
        }

        for &segment_id in &segments {
            self.solve_segment_max_limits(network, segment_id);
        }

        for &node_id in &pending {
            if let Some(junction) = self.junctions.get_mut(&node_id) {
                junction.calculate();
            }
        }
    }

    /// Baut die Mittel- und Randkurven eines Segments aus der Topologie und
    /// den Parametern beider Enden neu und verteilt sie an beide Kreuzungen.
    fn refresh_segment_curves(&mut self, network: &Network, segment_id: u64) {
        let Some(segment) = network.segment(segment_id) else {
            return;
        };
        let Some(start_junction) = network.junction(segment.start_node) else {
            return;
        };
        let Some(end_junction) = network.junction(segment.end_node) else {
            return;
        };

        let start_influence = self.end_influence(segment.start_node, segment_id);
        let end_influence = self.end_influence(segment.end_node, segment_id);
        let start_fix = self.pass_through_direction(network, segment.start_node, segment_id);
        let end_fix = self.pass_through_direction(network, segment.end_node, segment_id);

        let curves = compute_segment_curves(
            segment,
            start_junction.position,
            end_junction.position,
            start_influence,
            end_influence,
            start_fix,
            end_fix,
        );

        if let Some(junction) = self.junctions.get_mut(&segment.start_node) {
            if let Some(end) = junction.end_mut(segment_id) {
                end.set_raw_curves(&curves);
            }
        }
        if segment.end_node != segment.start_node {
            if let Some(junction) = self.junctions.get_mut(&segment.end_node) {
                if let Some(end) = junction.end_mut(segment_id) {
                    end.set_raw_curves(&curves);
                }
            }
        }
    }

    fn end_influence(&self, node_id: u64, segment_id: u64) -> EndInfluence {
        self.junctions
            .get(&node_id)
            .and_then(|junction| junction.end(segment_id))
            .map(|end| EndInfluence {
                shift: end.shift(),
                twist_deg: end.twist_deg(),
                stretch: end.stretch(),
            })
            .unwrap_or_default()
    }

    /// Richtungs-Korrektur an Durchgangsknoten: bei einer Middle-Kreuzung mit
    /// genau zwei Segmenten wird die Tangente gegen die des Nachbarsegments
    /// symmetriert, damit die Straße glatt durchläuft.
    fn pass_through_direction(
        &self,
        network: &Network,
        node_id: u64,
        segment_id: u64,
    ) -> Option<Vec3> {
        let junction = self.junctions.get(&node_id)?;
        if junction.style != NodeStyleType::Middle || junction.end_count() != 2 {
            return None;
        }
        let other = junction
            .ends()
            .iter()
            .find(|end| end.segment_id != segment_id)?;
        network.direction_at(other.segment_id, node_id)
    }

    /// Max-Limits eines Segments: jedes Ende wird gegen die Eckparameter des
    /// Gegenendes begrenzt; ein unverwaltetes Gegenende liefert keinen
    /// Beitrag.
    fn solve_segment_max_limits(&mut self, network: &Network, segment_id: u64) {
        let Some(segment) = network.segment(segment_id) else {
            return;
        };
        let start_corners = self
            .junctions
            .get(&segment.start_node)
            .and_then(|junction| junction.end(segment_id))
            .map(corner_parameters);
        let end_corners = self
            .junctions
            .get(&segment.end_node)
            .and_then(|junction| junction.end(segment_id))
            .map(corner_parameters);

        if let Some(junction) = self.junctions.get_mut(&segment.start_node) {
            if let Some(end) = junction.end_mut(segment_id) {
                calculate_max_limits(end, end_corners);
            }
        }
        if segment.end_node != segment.start_node {
            if let Some(junction) = self.junctions.get_mut(&segment.end_node) {
                if let Some(end) = junction.end_mut(segment_id) {
                    calculate_max_limits(end, start_corners);
                }
            }
        }
    }

    /// Zeigen die (genau zwei) Segmente eines Knotens fast exakt voneinander
    /// weg?
    fn near_opposite(&self, network: &Network, node_id: u64) -> bool {
        let directions: Vec<Vec3> = network
            .attached_segments(node_id)
            .iter()
            .filter_map(|&segment_id| network.direction_at(segment_id, node_id))
            .map(flat_normalized)
            .collect();
        match directions.as_slice() {
            [first, second] => first.dot(*second) < NEAR_OPPOSITE_DOT,
            _ => false,
        }
    }
}
