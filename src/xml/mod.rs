//! XML Import/Export für Kreuzungs-Records.
//!
//! Das Format ist ein flacher Attribut-Record: ein `<node>`-Element je
//! Kreuzung (Archetyp und Hauptstraßen-Wahl), darunter ein leeres
//! `<end>`-Element je Segmentende mit allen einstellbaren Parametern.

pub mod parser;
pub mod writer;

pub use parser::parse_junction_config;
pub use writer::write_junction_config;

use crate::core::{JunctionManager, NodeStyleType};

/// Format-Version des Attribut-Records.
pub const CONFIG_VERSION: u32 = 1;

/// Gespeicherter Zustand eines Segmentendes.
#[derive(Debug, Clone, PartialEq)]
pub struct EndRecord {
    pub segment_id: u64,
    pub offset: f32,
    pub shift: f32,
    pub rotate_deg: f32,
    pub slope_deg: f32,
    pub twist_deg: f32,
    pub stretch: f32,
    pub no_markings: bool,
    pub collision: bool,
    pub force_node_less: bool,
    pub is_slope: bool,
    pub keep_defaults: bool,
}

/// Gespeicherter Zustand einer Kreuzung.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionRecord {
    pub id: u64,
    pub style: NodeStyleType,
    pub main_auto: bool,
    pub main_first: Option<u64>,
    pub main_second: Option<u64>,
    pub ends: Vec<EndRecord>,
}

/// Kompletter Record-Satz einer gespeicherten Sitzung.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionConfig {
    pub version: u32,
    pub nodes: Vec<JunctionRecord>,
}

/// Liest den Zustand aller verwalteten Kreuzungen in Records aus.
pub fn snapshot_manager(manager: &JunctionManager) -> JunctionConfig {
    let nodes = manager
        .junctions()
        .map(|junction| JunctionRecord {
            id: junction.id,
            style: junction.style,
            main_auto: junction.main_road.auto,
            main_first: junction.main_road.first,
            main_second: junction.main_road.second,
            ends: junction
                .ends()
                .iter()
                .map(|end| EndRecord {
                    segment_id: end.segment_id,
                    offset: end.offset(),
                    shift: end.shift(),
                    rotate_deg: end.rotate_deg(),
                    slope_deg: end.slope_deg(),
                    twist_deg: end.twist_deg(),
                    stretch: end.stretch(),
                    no_markings: end.no_markings,
                    collision: end.collision,
                    force_node_less: end.force_node_less,
                    is_slope: end.is_slope,
                    keep_defaults: end.keep_defaults,
                })
                .collect(),
        })
        .collect();

    JunctionConfig {
        version: CONFIG_VERSION,
        nodes,
    }
}

/// Spielt Records auf einen Manager zurück. Kreuzungen und Segmentenden,
/// die im aktuellen Netzwerk fehlen, werden mit Warnung übersprungen;
/// alles Übernommene landet in der Warteschlange und wird beim nächsten
/// `process_updates` aufgelöst.
pub fn apply_config(manager: &mut JunctionManager, config: &JunctionConfig) {
    for record in &config.nodes {
        let default_is_slope = manager.options.node_is_sloped_by_default;
        let Some(junction) = manager.junction_mut(record.id) else {
            log::warn!(
                "Gespeicherte Kreuzung {} existiert nicht mehr im Netzwerk",
                record.id
            );
            continue;
        };

        junction.set_style(record.style, default_is_slope);
        if record.main_auto {
            junction.reset_main_road();
        } else if let (Some(first), Some(second)) = (record.main_first, record.main_second) {
            junction.set_main_road(first, second);
        }

        for end_record in &record.ends {
            let Some(end) = junction.end_mut(end_record.segment_id) else {
                log::warn!(
                    "Gespeichertes Segmentende {} fehlt an Kreuzung {}",
                    end_record.segment_id,
                    record.id
                );
                continue;
            };
            end.restore_parameters(
                end_record.offset,
                end_record.shift,
                end_record.rotate_deg,
                end_record.slope_deg,
                end_record.twist_deg,
                end_record.stretch,
            );
            end.no_markings = end_record.no_markings;
            end.collision = end_record.collision;
            end.force_node_less = end_record.force_node_less;
            end.is_slope = end_record.is_slope;
            end.keep_defaults = end_record.keep_defaults;
        }
    }
}
