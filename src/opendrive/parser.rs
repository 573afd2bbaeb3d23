//! Streaming OpenDRIVE reader.
//!
//! Walks the XML event stream once and builds an [`OpenDrive`] model. Elements
//! outside the plan view, elevation profile and lane layout are skipped.

use super::model::*;
use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;

/// Reads and parses an `.xodr` file
pub fn parse_opendrive_file(path: &Path) -> Result<OpenDrive> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read OpenDRIVE file {}", path.display()))?;
    parse_opendrive(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parses OpenDRIVE XML from a string
pub fn parse_opendrive(xml_content: &str) -> Result<OpenDrive> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();
    let mut state = ParseState::default();
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
                saw_root |= tag == "OpenDRIVE";
                let attrs = Attrs::collect(&reader, e)?;
                state.open(&tag, &attrs)?;
            }
            Ok(Event::Empty(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
                saw_root |= tag == "OpenDRIVE";
                let attrs = Attrs::collect(&reader, e)?;
                state.open(&tag, &attrs)?;
                state.close(&tag);
            }
            Ok(Event::End(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
                state.close(&tag);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("XML error at byte {}", reader.buffer_position())
                })
            }
            _ => {}
        }

        buffer.clear();
    }

    if !saw_root {
        bail!("Missing <OpenDRIVE> root element");
    }

    Ok(state.document)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionSide {
    Left,
    Center,
    Right,
}

#[derive(Default)]
struct ParseState {
    document: OpenDrive,
    road: Option<Road>,
    geometry: Option<Geometry>,
    section: Option<LaneSection>,
    side: Option<SectionSide>,
    lane: Option<Lane>,
}

impl ParseState {
    fn open(&mut self, tag: &str, attrs: &Attrs) -> Result<()> {
        match tag {
            "header" => {
                self.document.header = Some(Header {
                    rev_major: attrs.parse("revMajor")?,
                    rev_minor: attrs.parse("revMinor")?,
                    name: attrs.string("name"),
                });
            }
            "road" => {
                let id = attrs
                    .string("id")
                    .ok_or_else(|| anyhow!("<road> without id attribute"))?;
                self.road = Some(Road {
                    name: attrs.string("name"),
                    length: attrs.f64_or("length", 0.0)?,
                    junction: attrs.string("junction"),
                    id,
                    ..Road::default()
                });
            }
            "geometry" if self.road.is_some() => {
                self.geometry = Some(Geometry {
                    s: attrs.f64_or("s", 0.0)?,
                    x: attrs.required_f64("x", tag)?,
                    y: attrs.required_f64("y", tag)?,
                    hdg: attrs.f64_or("hdg", 0.0)?,
                    length: attrs.f64_or("length", 0.0)?,
                    kind: GeometryKind::Line,
                });
            }
            "line" | "arc" | "spiral" | "poly3" | "paramPoly3" => {
                if let Some(geometry) = self.geometry.as_mut() {
                    geometry.kind = geometry_kind(tag, attrs)?;
                }
            }
            "elevation" => {
                if let Some(road) = self.road.as_mut() {
                    road.elevation_profile.push(poly3_record(attrs)?);
                }
            }
            "laneOffset" => {
                if let Some(road) = self.road.as_mut() {
                    road.lane_offsets.push(poly3_record(attrs)?);
                }
            }
            "laneSection" if self.road.is_some() => {
                self.section = Some(LaneSection {
                    s: attrs.f64_or("s", 0.0)?,
                    ..LaneSection::default()
                });
            }
            "left" if self.section.is_some() => self.side = Some(SectionSide::Left),
            "center" if self.section.is_some() => self.side = Some(SectionSide::Center),
            "right" if self.section.is_some() => self.side = Some(SectionSide::Right),
            "lane" if self.side.is_some() => {
                let id = attrs
                    .parse::<i32>("id")?
                    .ok_or_else(|| anyhow!("<lane> without id attribute"))?;
                self.lane = Some(Lane {
                    id,
                    lane_type: attrs.string("type").unwrap_or_else(|| "none".to_string()),
                    level: matches!(attrs.get("level"), Some("true") | Some("1")),
                    ..Lane::default()
                });
            }
            "width" => {
                if let Some(lane) = self.lane.as_mut() {
                    lane.widths.push(LaneWidth {
                        s_offset: attrs.f64_or("sOffset", 0.0)?,
                        a: attrs.f64_or("a", 0.0)?,
                        b: attrs.f64_or("b", 0.0)?,
                        c: attrs.f64_or("c", 0.0)?,
                        d: attrs.f64_or("d", 0.0)?,
                        length: attrs.parse("length")?,
                    });
                }
            }
            "roadMark" => {
                if let Some(lane) = self.lane.as_mut() {
                    lane.road_marks.push(RoadMark {
                        s_offset: attrs.f64_or("sOffset", 0.0)?,
                        mark_type: attrs.string("type").unwrap_or_else(|| "none".to_string()),
                        width: attrs.parse("width")?,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, tag: &str) {
        match tag {
            "geometry" => {
                if let (Some(geometry), Some(road)) = (self.geometry.take(), self.road.as_mut()) {
                    road.plan_view.push(geometry);
                }
            }
            "lane" => {
                if let (Some(lane), Some(section)) = (self.lane.take(), self.section.as_mut()) {
                    match self.side {
                        Some(SectionSide::Left) => section.left.push(lane),
                        Some(SectionSide::Center) => section.center.push(lane),
                        Some(SectionSide::Right) => section.right.push(lane),
                        None => {}
                    }
                }
            }
            "left" | "center" | "right" if self.lane.is_none() => self.side = None,
            "laneSection" => {
                if let (Some(section), Some(road)) = (self.section.take(), self.road.as_mut()) {
                    road.lane_sections.push(section);
                }
                self.side = None;
            }
            "road" => {
                if let Some(road) = self.road.take() {
                    self.document.roads.push(road);
                }
            }
            _ => {}
        }
    }
}

fn geometry_kind(tag: &str, attrs: &Attrs) -> Result<GeometryKind> {
    let kind = match tag {
        "arc" => GeometryKind::Arc {
            curvature: attrs.required_f64("curvature", tag)?,
        },
        "spiral" => GeometryKind::Spiral {
            curv_start: attrs.f64_or("curvStart", 0.0)?,
            curv_end: attrs.f64_or("curvEnd", 0.0)?,
        },
        "poly3" => GeometryKind::Poly3 {
            a: attrs.f64_or("a", 0.0)?,
            b: attrs.f64_or("b", 0.0)?,
            c: attrs.f64_or("c", 0.0)?,
            d: attrs.f64_or("d", 0.0)?,
        },
        "paramPoly3" => GeometryKind::ParamPoly3 {
            au: attrs.f64_or("aU", 0.0)?,
            bu: attrs.f64_or("bU", 0.0)?,
            cu: attrs.f64_or("cU", 0.0)?,
            du: attrs.f64_or("dU", 0.0)?,
            av: attrs.f64_or("aV", 0.0)?,
            bv: attrs.f64_or("bV", 0.0)?,
            cv: attrs.f64_or("cV", 0.0)?,
            dv: attrs.f64_or("dV", 0.0)?,
            p_range: match attrs.get("pRange") {
                Some("arcLength") => ParamRange::ArcLength,
                Some("normalized") | None => ParamRange::Normalized,
                Some(other) => bail!("Unknown pRange '{}'", other),
            },
        },
        _ => GeometryKind::Line,
    };
    Ok(kind)
}

fn poly3_record(attrs: &Attrs) -> Result<Poly3Record> {
    Ok(Poly3Record {
        s: attrs.f64_or("s", 0.0)?,
        a: attrs.f64_or("a", 0.0)?,
        b: attrs.f64_or("b", 0.0)?,
        c: attrs.f64_or("c", 0.0)?,
        d: attrs.f64_or("d", 0.0)?,
        length: attrs.parse("length")?,
    })
}

/// Attributes of one element, decoded and unescaped
struct Attrs(HashMap<String, String>);

impl Attrs {
    fn collect(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Self> {
        let mut map = HashMap::new();
        for attr in e.attributes().with_checks(false) {
            let attr = attr?;
            let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
            let value = attr.unescape_value()?.into_owned();
            map.insert(key, value);
        }
        Ok(Attrs(map))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.trim())
    }

    fn string(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(name) {
            Some(raw) => {
                let value = raw
                    .parse::<T>()
                    .with_context(|| format!("Invalid value for attribute {}: '{}'", name, raw))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn f64_or(&self, name: &str, default: f64) -> Result<f64> {
        Ok(self.parse::<f64>(name)?.unwrap_or(default))
    }

    fn required_f64(&self, name: &str, tag: &str) -> Result<f64> {
        self.parse::<f64>(name)?
            .ok_or_else(|| anyhow!("<{}> without {} attribute", tag, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" standalone="yes"?>
<OpenDRIVE>
    <header revMajor="1" revMinor="4" name="sample"/>
    <road name="r" length="30.0" id="7" junction="-1">
        <planView>
            <geometry s="0.0" x="0.0" y="0.0" hdg="0.0" length="10.0">
                <line/>
            </geometry>
            <geometry s="10.0" x="10.0" y="0.0" hdg="0.0" length="10.0">
                <arc curvature="0.05"/>
            </geometry>
            <geometry s="20.0" x="19.6" y="2.4" hdg="0.5" length="10.0">
                <paramPoly3 aU="0" bU="10" cU="0" dU="0" aV="0" bV="0" cV="1" dV="0" pRange="normalized"/>
            </geometry>
        </planView>
        <elevationProfile>
            <elevation s="0.0" a="1.0" b="0.1" c="0.0" d="0.0"/>
        </elevationProfile>
        <lanes>
            <laneOffset s="0.0" a="0.5" b="0" c="0" d="0"/>
            <laneSection s="0.0">
                <left>
                    <lane id="1" type="driving" level="false">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                        <roadMark sOffset="0.0" type="solid" width="0.12"/>
                    </lane>
                </left>
                <center>
                    <lane id="0" type="none" level="false"/>
                </center>
                <right>
                    <lane id="-1" type="driving" level="false">
                        <width sOffset="0.0" a="4.0" b="0.0" c="0.0" d="0.0"/>
                    </lane>
                </right>
            </laneSection>
        </lanes>
    </road>
</OpenDRIVE>
"#;

    #[test]
    fn test_parse_sample() {
        let doc = parse_opendrive(SAMPLE).unwrap();
        let header = doc.header.as_ref().unwrap();
        assert_eq!(header.rev_minor, Some(4));

        assert_eq!(doc.roads.len(), 1);
        let road = &doc.roads[0];
        assert_eq!(road.id, "7");
        assert_eq!(road.length, 30.0);
        assert_eq!(road.plan_view.len(), 3);
        assert_eq!(road.plan_view[0].kind, GeometryKind::Line);
        assert_eq!(road.plan_view[1].kind, GeometryKind::Arc { curvature: 0.05 });
        assert!(matches!(
            road.plan_view[2].kind,
            GeometryKind::ParamPoly3 { p_range: ParamRange::Normalized, .. }
        ));

        assert_eq!(road.elevation_profile.len(), 1);
        assert_eq!(road.lane_offsets[0].a, 0.5);

        let section = &road.lane_sections[0];
        assert_eq!(section.left.len(), 1);
        assert_eq!(section.center.len(), 1);
        assert_eq!(section.right.len(), 1);
        assert_eq!(section.right[0].id, -1);
        assert_eq!(section.right[0].widths[0].a, 4.0);
        assert_eq!(section.left[0].road_marks[0].mark_type, "solid");
        assert_eq!(section.left[0].road_marks[0].width, Some(0.12));
    }

    #[test]
    fn test_missing_root_fails() {
        let err = parse_opendrive("<roads></roads>").unwrap_err();
        assert!(format!("{err:#}").contains("OpenDRIVE"));
    }

    #[test]
    fn test_invalid_number_fails_with_context() {
        let xml = r#"<OpenDRIVE><road id="1" length="abc"></road></OpenDRIVE>"#;
        let err = parse_opendrive(xml).unwrap_err();
        assert!(format!("{err:#}").contains("length"));
    }

    #[test]
    fn test_road_without_id_fails() {
        let xml = r#"<OpenDRIVE><road length="1"></road></OpenDRIVE>"#;
        assert!(parse_opendrive(xml).is_err());
    }

    #[test]
    fn test_unknown_elements_are_ignored() {
        let xml = r#"<OpenDRIVE>
            <road id="1" length="5">
                <link><successor elementType="road" elementId="2"/></link>
                <objects><object id="o" width="2.0"/></objects>
                <planView><geometry s="0" x="1" y="2" hdg="0" length="5"><line/></geometry></planView>
            </road>
        </OpenDRIVE>"#;
        let doc = parse_opendrive(xml).unwrap();
        assert_eq!(doc.roads[0].plan_view.len(), 1);
        assert!(doc.roads[0].lane_sections.is_empty());
    }
}
