//! Parser für Kreuzungs-Records im XML-Format.

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::NodeStyleType;
use crate::xml::{EndRecord, JunctionConfig, JunctionRecord};

/// Parsed einen Record-Satz aus einem XML-String.
pub fn parse_junction_config(xml_content: &str) -> Result<JunctionConfig> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();

    let mut version: Option<u32> = None;
    let mut nodes: Vec<JunctionRecord> = Vec::new();
    let mut current_node: Option<JunctionRecord> = None;

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let tag = reader.decoder().decode(name.as_ref())?;

                if tag == "junctions" {
                    version = Some(parse_version(&reader, e)?);
                } else if tag == "node" {
                    if current_node.is_some() {
                        bail!("Verschachteltes <node>-Element");
                    }
                    current_node = Some(parse_node_record(&reader, e)?);
                } else if tag == "end" {
                    let record = parse_end_record(&reader, e)?;
                    match current_node.as_mut() {
                        Some(node) => node.ends.push(record),
                        None => bail!("<end>-Element außerhalb von <node>"),
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let tag = reader.decoder().decode(name.as_ref())?;

                if tag == "junctions" {
                    version = Some(parse_version(&reader, e)?);
                } else if tag == "node" {
                    // Selbstschließendes <node/> ohne Enden, kein End-Event.
                    if current_node.is_some() {
                        bail!("Verschachteltes <node>-Element");
                    }
                    nodes.push(parse_node_record(&reader, e)?);
                } else if tag == "end" {
                    let record = parse_end_record(&reader, e)?;
                    match current_node.as_mut() {
                        Some(node) => node.ends.push(record),
                        None => bail!("<end>-Element außerhalb von <node>"),
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let tag = reader.decoder().decode(name.as_ref())?;
                if tag == "node" {
                    if let Some(node) = current_node.take() {
                        nodes.push(node);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err).context("Fehler beim Parsen des XML"),
            _ => {}
        }

        buffer.clear();
    }

    if let Some(node) = current_node.take() {
        nodes.push(node);
    }

    let version = version.context("Kein <junctions>-Wurzelelement mit Version gefunden")?;

    Ok(JunctionConfig { version, nodes })
}

fn parse_version<R>(reader: &Reader<R>, element: &BytesStart<'_>) -> Result<u32> {
    let mut version: Option<u32> = None;
    for attr in element.attributes().with_checks(false) {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?;
        if key == "version" {
            let value = attr.unescape_value()?;
            version = Some(
                value
                    .trim()
                    .parse::<u32>()
                    .context("Version konnte nicht gelesen werden")?,
            );
        }
    }
    version.context("<junctions> ohne version-Attribut")
}

fn parse_node_record<R>(reader: &Reader<R>, element: &BytesStart<'_>) -> Result<JunctionRecord> {
    let mut id: Option<u64> = None;
    let mut style: Option<NodeStyleType> = None;
    let mut main_auto = true;
    let mut main_first: Option<u64> = None;
    let mut main_second: Option<u64> = None;

    for attr in element.attributes().with_checks(false) {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        match key.as_ref() {
            "id" => id = Some(parse_u64(&value).context("Ungültige Kreuzungs-ID")?),
            "style" => {
                style = Some(
                    NodeStyleType::from_name(&value)
                        .with_context(|| format!("Unbekannter Archetyp '{}'", value))?,
                )
            }
            "mainAuto" => main_auto = parse_bool(&value)?,
            "mainFirst" => main_first = Some(parse_u64(&value)?),
            "mainSecond" => main_second = Some(parse_u64(&value)?),
            _ => {}
        }
    }

    Ok(JunctionRecord {
        id: id.context("<node> ohne id-Attribut")?,
        style: style.context("<node> ohne style-Attribut")?,
        main_auto,
        main_first,
        main_second,
        ends: Vec::new(),
    })
}

fn parse_end_record<R>(reader: &Reader<R>, element: &BytesStart<'_>) -> Result<EndRecord> {
    let mut segment_id: Option<u64> = None;
    let mut record = EndRecord {
        segment_id: 0,
        offset: 0.0,
        shift: 0.0,
        rotate_deg: 0.0,
        slope_deg: 0.0,
        twist_deg: 0.0,
        stretch: 1.0,
        no_markings: false,
        collision: true,
        force_node_less: false,
        is_slope: false,
        keep_defaults: true,
    };

    for attr in element.attributes().with_checks(false) {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        match key.as_ref() {
            "segment" => segment_id = Some(parse_u64(&value).context("Ungültige Segment-ID")?),
            "offset" => record.offset = parse_f32(&value)?,
            "shift" => record.shift = parse_f32(&value)?,
            "rotate" => record.rotate_deg = parse_f32(&value)?,
            "slope" => record.slope_deg = parse_f32(&value)?,
            "twist" => record.twist_deg = parse_f32(&value)?,
            "stretch" => record.stretch = parse_f32(&value)?,
            "noMarkings" => record.no_markings = parse_bool(&value)?,
            "collision" => record.collision = parse_bool(&value)?,
            "forceNodeLess" => record.force_node_less = parse_bool(&value)?,
            "isSlope" => record.is_slope = parse_bool(&value)?,
            "keepDefaults" => record.keep_defaults = parse_bool(&value)?,
            _ => {}
        }
    }

    record.segment_id = segment_id.context("<end> ohne segment-Attribut")?;
    Ok(record)
}

fn parse_u64(value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Wert '{}' ist keine gültige ID", value.trim()))
}

fn parse_f32(value: &str) -> Result<f32> {
    value
        .trim()
        .parse::<f32>()
        .with_context(|| format!("Wert '{}' ist keine Zahl", value.trim()))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => bail!("Wert '{}' ist kein Wahrheitswert", other),
    }
}
