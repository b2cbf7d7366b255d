//! Writer für Kreuzungs-Records im XML-Format.

use crate::xml::{EndRecord, JunctionConfig, JunctionRecord};

/// Schreibt einen Record-Satz als XML-String. Kreuzungen und Enden werden
/// nach ID sortiert ausgegeben, damit der Export deterministisch bleibt.
pub fn write_junction_config(config: &JunctionConfig) -> String {
    let mut output = String::new();
    output.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>\n");
    output.push_str(&format!("<junctions version=\"{}\">\n", config.version));

    let mut nodes: Vec<&JunctionRecord> = config.nodes.iter().collect();
    nodes.sort_unstable_by_key(|record| record.id);

    for record in nodes {
        let mut attributes = format!(
            "id=\"{}\" style=\"{}\" mainAuto=\"{}\"",
            record.id,
            record.style.name(),
            record.main_auto
        );
        if let Some(first) = record.main_first {
            attributes.push_str(&format!(" mainFirst=\"{}\"", first));
        }
        if let Some(second) = record.main_second {
            attributes.push_str(&format!(" mainSecond=\"{}\"", second));
        }

        if record.ends.is_empty() {
            output.push_str(&format!("    <node {}/>\n", attributes));
            continue;
        }

        output.push_str(&format!("    <node {}>\n", attributes));

        let mut ends: Vec<&EndRecord> = record.ends.iter().collect();
        ends.sort_unstable_by_key(|end| end.segment_id);

        for end in ends {
            output.push_str(&format!(
                "        <end segment=\"{}\" offset=\"{}\" shift=\"{}\" rotate=\"{}\" \
                 slope=\"{}\" twist=\"{}\" stretch=\"{}\" noMarkings=\"{}\" collision=\"{}\" \
                 forceNodeLess=\"{}\" isSlope=\"{}\" keepDefaults=\"{}\"/>\n",
                end.segment_id,
                format_float(end.offset),
                format_float(end.shift),
                format_float(end.rotate_deg),
                format_float(end.slope_deg),
                format_float(end.twist_deg),
                format_float(end.stretch),
                end.no_markings,
                end.collision,
                end.force_node_less,
                end.is_slope,
                end.keep_defaults,
            ));
        }

        output.push_str("    </node>\n");
    }

    output.push_str("</junctions>\n");
    output
}

fn format_float(value: f32) -> String {
    format!("{:.3}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeStyleType;
    use crate::xml::{parse_junction_config, CONFIG_VERSION};

    #[test]
    fn test_format_float_precision() {
        assert_eq!(format_float(123.456_79), "123.457");
        assert_eq!(format_float(8.0), "8.000");
        assert_eq!(format_float(-2.5), "-2.500");
        assert_eq!(format_float(0.000_4), "0.000");
    }

    fn sample_config() -> JunctionConfig {
        JunctionConfig {
            version: CONFIG_VERSION,
            nodes: vec![
                JunctionRecord {
                    id: 9,
                    style: NodeStyleType::End,
                    main_auto: true,
                    main_first: None,
                    main_second: None,
                    ends: vec![],
                },
                JunctionRecord {
                    id: 4,
                    style: NodeStyleType::Custom,
                    main_auto: false,
                    main_first: Some(7),
                    main_second: Some(9),
                    ends: vec![EndRecord {
                        segment_id: 7,
                        offset: 8.5,
                        shift: -2.25,
                        rotate_deg: 15.0,
                        slope_deg: 0.0,
                        twist_deg: 10.0,
                        stretch: 1.25,
                        no_markings: true,
                        collision: false,
                        force_node_less: false,
                        is_slope: true,
                        keep_defaults: false,
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_writer_sortiert_nach_id() {
        let written = write_junction_config(&sample_config());
        let first = written.find("id=\"4\"").expect("Kreuzung 4 fehlt im Export");
        let second = written.find("id=\"9\"").expect("Kreuzung 9 fehlt im Export");
        assert!(first < second, "Export muss nach Kreuzungs-ID sortieren");
    }

    #[test]
    fn test_roundtrip_erhaelt_records() {
        let config = sample_config();
        let written = write_junction_config(&config);
        let reparsed = parse_junction_config(&written).expect("Re-Parsing fehlgeschlagen");

        assert_eq!(reparsed.version, config.version);
        assert_eq!(reparsed.nodes.len(), config.nodes.len());

        let node = reparsed
            .nodes
            .iter()
            .find(|node| node.id == 4)
            .expect("Kreuzung 4 fehlt nach Roundtrip");
        assert_eq!(node.style, NodeStyleType::Custom);
        assert_eq!(node.main_first, Some(7));
        assert_eq!(node.ends.len(), 1);

        // Alle Werte sind mit drei Nachkommastellen exakt darstellbar.
        let original = &config.nodes[1].ends[0];
        assert_eq!(&node.ends[0], original);
    }
}
