//! Campaign JSON to OpenDRIVE conversion.
//!
//! Road records arrive in the attribute-prefixed layout produced by
//! XML-to-JSON dumps (`"@id"`, `"@length"`, ...), grouped in an array of
//! `{"OpenDRIVE": {"road": ...}}` sections. Each road is written to its own
//! `<id>.xodr` file.

use super::model::*;
use super::writer::write_single_road;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single object or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }
}

/// Attribute value; dumps store numbers as strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    fn as_f64(&self, name: &str) -> Result<f64> {
        match self {
            Scalar::Text(text) => text
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid number for {}: '{}'", name, text)),
            Scalar::Number(n) => n
                .as_f64()
                .ok_or_else(|| anyhow!("Number out of range for {}", name)),
            Scalar::Bool(_) => Err(anyhow!("Expected a number for {}", name)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => write!(f, "{}", text),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonSection {
    #[serde(rename = "OpenDRIVE")]
    pub open_drive: JsonOpenDrive,
}

#[derive(Debug, Deserialize)]
pub struct JsonOpenDrive {
    pub road: OneOrMany<JsonRoad>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRoad {
    #[serde(rename = "@id")]
    pub id: Scalar,
    #[serde(rename = "@length")]
    pub length: Scalar,
    #[serde(rename = "planView")]
    pub plan_view: JsonPlanView,
    pub lanes: JsonLanes,
}

#[derive(Debug, Deserialize)]
pub struct JsonPlanView {
    pub geometry: OneOrMany<JsonGeometry>,
}

#[derive(Debug, Deserialize)]
pub struct JsonGeometry {
    #[serde(rename = "@s")]
    pub s: Scalar,
    #[serde(rename = "@x")]
    pub x: Scalar,
    #[serde(rename = "@y")]
    pub y: Scalar,
    #[serde(rename = "@hdg")]
    pub hdg: Scalar,
    #[serde(rename = "@length")]
    pub length: Scalar,
    #[serde(rename = "paramPoly3")]
    pub param_poly3: JsonParamPoly3,
}

#[derive(Debug, Deserialize)]
pub struct JsonParamPoly3 {
    #[serde(rename = "@pRange")]
    pub p_range: Scalar,
    #[serde(rename = "@aU")]
    pub au: Scalar,
    #[serde(rename = "@bU")]
    pub bu: Scalar,
    #[serde(rename = "@cU")]
    pub cu: Scalar,
    #[serde(rename = "@dU")]
    pub du: Scalar,
    #[serde(rename = "@aV")]
    pub av: Scalar,
    #[serde(rename = "@bV")]
    pub bv: Scalar,
    #[serde(rename = "@cV")]
    pub cv: Scalar,
    #[serde(rename = "@dV")]
    pub dv: Scalar,
}

#[derive(Debug, Deserialize)]
pub struct JsonLanes {
    #[serde(rename = "laneSection")]
    pub lane_section: JsonLaneSection,
}

#[derive(Debug, Deserialize)]
pub struct JsonLaneSection {
    #[serde(rename = "@s")]
    pub s: Scalar,
    pub left: Option<JsonSide>,
    pub center: Option<JsonSide>,
    pub right: Option<JsonSide>,
}

#[derive(Debug, Deserialize)]
pub struct JsonSide {
    pub lane: OneOrMany<JsonLane>,
}

#[derive(Debug, Deserialize)]
pub struct JsonLane {
    #[serde(rename = "@id")]
    pub id: Scalar,
    #[serde(rename = "@type")]
    pub lane_type: Scalar,
    #[serde(rename = "@level")]
    pub level: Scalar,
    pub width: Option<JsonWidth>,
    #[serde(rename = "roadMark")]
    pub road_mark: Option<JsonRoadMark>,
}

#[derive(Debug, Deserialize)]
pub struct JsonWidth {
    #[serde(rename = "@a")]
    pub a: Scalar,
}

#[derive(Debug, Deserialize)]
pub struct JsonRoadMark {
    #[serde(rename = "@type")]
    pub mark_type: Scalar,
    #[serde(rename = "@width")]
    pub width: Option<Scalar>,
}

impl JsonRoad {
    /// Converts the record into the road model
    pub fn to_road(&self) -> Result<Road> {
        let id = self.id.to_string();
        let plan_view = self
            .plan_view
            .geometry
            .as_slice()
            .iter()
            .map(|g| g.to_geometry())
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Invalid planView in road {}", id))?;

        let section = &self.lanes.lane_section;
        let lane_section = LaneSection {
            s: section.s.as_f64("laneSection s")?,
            left: side_lanes(&section.left)?,
            center: side_lanes(&section.center)?,
            right: side_lanes(&section.right)?,
        };

        Ok(Road {
            length: self.length.as_f64("road length")?,
            plan_view,
            lane_sections: vec![lane_section],
            id,
            ..Road::default()
        })
    }
}

impl JsonGeometry {
    fn to_geometry(&self) -> Result<Geometry> {
        let p = &self.param_poly3;
        let p_range = match p.p_range.to_string().as_str() {
            "arcLength" => ParamRange::ArcLength,
            "normalized" => ParamRange::Normalized,
            other => return Err(anyhow!("Unknown pRange '{}'", other)),
        };
        Ok(Geometry {
            s: self.s.as_f64("s")?,
            x: self.x.as_f64("x")?,
            y: self.y.as_f64("y")?,
            hdg: self.hdg.as_f64("hdg")?,
            length: self.length.as_f64("length")?,
            kind: GeometryKind::ParamPoly3 {
                au: p.au.as_f64("aU")?,
                bu: p.bu.as_f64("bU")?,
                cu: p.cu.as_f64("cU")?,
                du: p.du.as_f64("dU")?,
                av: p.av.as_f64("aV")?,
                bv: p.bv.as_f64("bV")?,
                cv: p.cv.as_f64("cV")?,
                dv: p.dv.as_f64("dV")?,
                p_range,
            },
        })
    }
}

impl JsonLane {
    fn to_lane(&self) -> Result<Lane> {
        let id = self
            .id
            .to_string()
            .trim()
            .parse::<i32>()
            .with_context(|| format!("Invalid lane id '{}'", self.id))?;
        let widths = match self.width {
            Some(ref w) => vec![LaneWidth {
                s_offset: 0.0,
                a: w.a.as_f64("width a")?,
                b: 0.0,
                c: 0.0,
                d: 0.0,
                length: None,
            }],
            None => Vec::new(),
        };
        let road_marks = match self.road_mark {
            Some(ref m) => vec![RoadMark {
                s_offset: 0.0,
                mark_type: m.mark_type.to_string(),
                width: m.width.as_ref().map(|w| w.as_f64("roadMark width")).transpose()?,
            }],
            None => Vec::new(),
        };
        Ok(Lane {
            id,
            lane_type: self.lane_type.to_string(),
            level: matches!(self.level.to_string().as_str(), "true" | "1"),
            widths,
            road_marks,
        })
    }
}

fn side_lanes(side: &Option<JsonSide>) -> Result<Vec<Lane>> {
    match side {
        Some(side) => side.lane.as_slice().iter().map(|l| l.to_lane()).collect(),
        None => Ok(Vec::new()),
    }
}

/// Parses campaign JSON into roads, in file order
pub fn parse_campaign_json(json_content: &str) -> Result<Vec<Road>> {
    let sections: Vec<JsonSection> =
        serde_json::from_str(json_content).context("Failed to parse campaign JSON")?;

    let mut roads = Vec::new();
    for section in sections {
        let records = section.open_drive.road.into_vec();
        log::debug!("Number of roads found in this section: {}", records.len());
        for record in records {
            log::debug!("Processing road ID: {}", record.id);
            roads.push(record.to_road()?);
        }
    }
    Ok(roads)
}

/// Converts a campaign JSON file into one `.xodr` file per road.
///
/// Returns the written paths.
pub fn convert_json_to_opendrive(json_file: &Path, output_folder: &Path) -> Result<Vec<PathBuf>> {
    let content = std::fs::read_to_string(json_file)
        .with_context(|| format!("Failed to read {}", json_file.display()))?;
    let roads = parse_campaign_json(&content)?;

    std::fs::create_dir_all(output_folder)
        .with_context(|| format!("Failed to create {}", output_folder.display()))?;

    let mut written = Vec::with_capacity(roads.len());
    for road in &roads {
        let path = output_folder.join(format!("{}.xodr", road.id));
        std::fs::write(&path, write_single_road(road))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    log::info!(
        "Converted {} roads from {} into {}",
        written.len(),
        json_file.display(),
        output_folder.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPAIGN: &str = r#"[
        {"OpenDRIVE": {"road": {
            "@id": "0", "@length": "20.0",
            "planView": {"geometry": [
                {"@s": "0.0", "@x": "0.0", "@y": "0.0", "@hdg": "0.0", "@length": "10.0",
                 "paramPoly3": {"@pRange": "arcLength", "@aU": "0", "@bU": "1", "@cU": "0", "@dU": "0",
                                "@aV": "0", "@bV": "0", "@cV": "0", "@dV": "0"}},
                {"@s": "10.0", "@x": "10.0", "@y": "0.0", "@hdg": "0.0", "@length": "10.0",
                 "paramPoly3": {"@pRange": "arcLength", "@aU": "0", "@bU": "1", "@cU": "0", "@dU": "0",
                                "@aV": "0", "@bV": "0", "@cV": "0.01", "@dV": "0"}}
            ]},
            "lanes": {"laneSection": {"@s": "0.0",
                "left": {"lane": {"@id": "1", "@type": "driving", "@level": "false",
                                  "width": {"@a": "4.0"},
                                  "roadMark": {"@type": "solid", "@width": "0.12"}}},
                "center": {"lane": {"@id": "0", "@type": "none", "@level": "false",
                                    "width": {"@a": "0.0"},
                                    "roadMark": {"@type": "broken", "@width": "0.12"}}},
                "right": {"lane": {"@id": "-1", "@type": "driving", "@level": "false",
                                   "width": {"@a": "4.0"},
                                   "roadMark": {"@type": "solid", "@width": "0.12"}}}
            }}
        }}},
        {"OpenDRIVE": {"road": [
            {"@id": "1", "@length": 5, "planView": {"geometry": {
                "@s": 0, "@x": 1, "@y": 2, "@hdg": 0, "@length": 5,
                "paramPoly3": {"@pRange": "normalized", "@aU": 0, "@bU": 5, "@cU": 0, "@dU": 0,
                               "@aV": 0, "@bV": 0, "@cV": 0, "@dV": 0}}},
             "lanes": {"laneSection": {"@s": 0}}}
        ]}}
    ]"#;

    #[test]
    fn test_parse_campaign() {
        let roads = parse_campaign_json(CAMPAIGN).unwrap();
        assert_eq!(roads.len(), 2);

        let road = &roads[0];
        assert_eq!(road.id, "0");
        assert_eq!(road.plan_view.len(), 2);
        let section = &road.lane_sections[0];
        assert_eq!(section.left[0].widths[0].a, 4.0);
        assert_eq!(section.right[0].id, -1);
        assert_eq!(section.center[0].road_marks[0].mark_type, "broken");

        // Single geometry object and bare numbers are accepted too.
        let road = &roads[1];
        assert_eq!(road.length, 5.0);
        assert_eq!(road.plan_view.len(), 1);
        assert!(road.lane_sections[0].right.is_empty());
    }

    #[test]
    fn test_invalid_number_reports_field() {
        let bad = CAMPAIGN.replacen("\"@hdg\": \"0.0\"", "\"@hdg\": \"north\"", 1);
        let err = parse_campaign_json(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("hdg"));
    }

    #[test]
    fn test_convert_writes_one_file_per_road() {
        let dir = std::env::temp_dir().join(format!("json2xodr_test_{}", std::process::id()));
        let json_file = dir.join("campaign.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&json_file, CAMPAIGN).unwrap();

        let out = dir.join("xodr");
        let written = convert_json_to_opendrive(&json_file, &out).unwrap();
        assert_eq!(written, vec![out.join("0.xodr"), out.join("1.xodr")]);

        let doc = crate::opendrive::parse_opendrive_file(&written[0]).unwrap();
        assert_eq!(doc.roads[0].plan_view.len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
