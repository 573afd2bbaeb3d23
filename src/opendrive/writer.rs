//! Writer for OpenDRIVE XML.

use super::model::*;

/// Serialises a whole document as pretty-printed OpenDRIVE XML
pub fn write_opendrive(document: &OpenDrive) -> String {
    let mut xml = XmlOut::new();

    xml.open("OpenDRIVE", &[]);
    if let Some(ref header) = document.header {
        let mut attrs = Vec::new();
        if let Some(major) = header.rev_major {
            attrs.push(("revMajor", major.to_string()));
        }
        if let Some(minor) = header.rev_minor {
            attrs.push(("revMinor", minor.to_string()));
        }
        if let Some(ref name) = header.name {
            attrs.push(("name", name.clone()));
        }
        xml.empty("header", &attrs);
    }
    for road in &document.roads {
        write_road(&mut xml, road);
    }
    xml.close("OpenDRIVE");

    xml.finish()
}

/// Serialises a single road wrapped in its own `<OpenDRIVE>` root
pub fn write_single_road(road: &Road) -> String {
    write_opendrive(&OpenDrive {
        header: None,
        roads: vec![road.clone()],
    })
}

fn write_road(xml: &mut XmlOut, road: &Road) {
    let mut attrs = vec![("id", road.id.clone()), ("length", format_float(road.length))];
    if let Some(ref name) = road.name {
        attrs.push(("name", name.clone()));
    }
    if let Some(ref junction) = road.junction {
        attrs.push(("junction", junction.clone()));
    }
    xml.open("road", &attrs);

    xml.open("planView", &[]);
    for geometry in &road.plan_view {
        write_geometry(xml, geometry);
    }
    xml.close("planView");

    if !road.elevation_profile.is_empty() {
        xml.open("elevationProfile", &[]);
        for record in &road.elevation_profile {
            xml.empty("elevation", &poly3_attrs(record));
        }
        xml.close("elevationProfile");
    }

    if !road.lane_sections.is_empty() || !road.lane_offsets.is_empty() {
        xml.open("lanes", &[]);
        for record in &road.lane_offsets {
            xml.empty("laneOffset", &poly3_attrs(record));
        }
        for section in &road.lane_sections {
            xml.open("laneSection", &[("s", format_float(section.s))]);
            for (side, lanes) in [
                ("left", &section.left),
                ("center", &section.center),
                ("right", &section.right),
            ]
            .iter()
            {
                if lanes.is_empty() {
                    continue;
                }
                xml.open(side, &[]);
                for lane in lanes.iter() {
                    write_lane(xml, lane);
                }
                xml.close(side);
            }
            xml.close("laneSection");
        }
        xml.close("lanes");
    }

    xml.close("road");
}

fn write_geometry(xml: &mut XmlOut, geometry: &Geometry) {
    xml.open(
        "geometry",
        &[
            ("s", format_float(geometry.s)),
            ("x", format_float(geometry.x)),
            ("y", format_float(geometry.y)),
            ("hdg", format_float(geometry.hdg)),
            ("length", format_float(geometry.length)),
        ],
    );
    match geometry.kind {
        GeometryKind::Line => xml.empty("line", &[]),
        GeometryKind::Arc { curvature } => {
            xml.empty("arc", &[("curvature", format_float(curvature))])
        }
        GeometryKind::Spiral { curv_start, curv_end } => xml.empty(
            "spiral",
            &[
                ("curvStart", format_float(curv_start)),
                ("curvEnd", format_float(curv_end)),
            ],
        ),
        GeometryKind::Poly3 { a, b, c, d } => xml.empty(
            "poly3",
            &[
                ("a", format_float(a)),
                ("b", format_float(b)),
                ("c", format_float(c)),
                ("d", format_float(d)),
            ],
        ),
        GeometryKind::ParamPoly3 {
            au,
            bu,
            cu,
            du,
            av,
            bv,
            cv,
            dv,
            p_range,
        } => xml.empty(
            "paramPoly3",
            &[
                ("pRange", p_range.as_str().to_string()),
                ("aU", format_float(au)),
                ("bU", format_float(bu)),
                ("cU", format_float(cu)),
                ("dU", format_float(du)),
                ("aV", format_float(av)),
                ("bV", format_float(bv)),
                ("cV", format_float(cv)),
                ("dV", format_float(dv)),
            ],
        ),
    }
    xml.close("geometry");
}

fn write_lane(xml: &mut XmlOut, lane: &Lane) {
    let attrs = [
        ("id", lane.id.to_string()),
        ("type", lane.lane_type.clone()),
        ("level", lane.level.to_string()),
    ];
    if lane.widths.is_empty() && lane.road_marks.is_empty() {
        xml.empty("lane", &attrs);
        return;
    }
    xml.open("lane", &attrs);
    for width in &lane.widths {
        let mut attrs = vec![
            ("sOffset", format_float(width.s_offset)),
            ("a", format_float(width.a)),
            ("b", format_float(width.b)),
            ("c", format_float(width.c)),
            ("d", format_float(width.d)),
        ];
        if let Some(length) = width.length {
            attrs.push(("length", format_float(length)));
        }
        xml.empty("width", &attrs);
    }
    for mark in &lane.road_marks {
        let mut attrs = vec![
            ("sOffset", format_float(mark.s_offset)),
            ("type", mark.mark_type.clone()),
        ];
        if let Some(width) = mark.width {
            attrs.push(("width", format_float(width)));
        }
        xml.empty("roadMark", &attrs);
    }
    xml.close("lane");
}

fn poly3_attrs(record: &Poly3Record) -> Vec<(&'static str, String)> {
    let mut attrs = vec![
        ("s", format_float(record.s)),
        ("a", format_float(record.a)),
        ("b", format_float(record.b)),
        ("c", format_float(record.c)),
        ("d", format_float(record.d)),
    ];
    if let Some(length) = record.length {
        attrs.push(("length", format_float(length)));
    }
    attrs
}

/// Indented XML text builder
struct XmlOut {
    output: String,
    depth: usize,
}

impl XmlOut {
    fn new() -> Self {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        Self { output, depth: 0 }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.output.push_str(&"    ".repeat(self.depth));
        self.output.push('<');
        self.output.push_str(tag);
        for (key, value) in attrs {
            self.output.push_str(&format!(" {}=\"{}\"", key, escape_xml(value)));
        }
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.start_tag(tag, attrs);
        self.output.push_str(">\n");
        self.depth += 1;
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.start_tag(tag, attrs);
        self.output.push_str("/>\n");
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.output.push_str(&"    ".repeat(self.depth));
        self.output.push_str(&format!("</{}>\n", tag));
    }

    fn finish(self) -> String {
        self.output
    }
}

// Shortest representation that parses back to the same value.
fn format_float(value: f64) -> String {
    format!("{}", value)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
