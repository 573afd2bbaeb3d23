use approx::assert_abs_diff_eq;
use opendrive_spline::opendrive::convert_json_to_opendrive;
use opendrive_spline::pipeline::{load_road_data, process_directory, ConverterConfig};
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("opendrive_spline_{}_{}", name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn straight_road(id: &str, geometries: usize) -> String {
    let plan_view: String = (0..geometries)
        .map(|i| {
            format!(
                r#"<geometry s="{s}" x="{s}" y="0.0" hdg="0.0" length="10.0"><line/></geometry>"#,
                s = i * 10
            )
        })
        .collect();
    format!(
        r#"<road id="{id}" length="{len}" junction="-1">
            <planView>{plan_view}</planView>
            <elevationProfile><elevation s="0" a="2.0" b="0" c="0" d="0"/></elevationProfile>
            <lanes>
                <laneSection s="0">
                    <left><lane id="1" type="driving" level="false"><width sOffset="0" a="3.5" b="0" c="0" d="0"/></lane></left>
                    <center><lane id="0" type="none" level="false"/></center>
                    <right><lane id="-1" type="driving" level="false"><width sOffset="0" a="3.5" b="0" c="0" d="0"/></lane></right>
                </laneSection>
            </lanes>
        </road>"#,
        id = id,
        len = geometries * 10,
        plan_view = plan_view
    )
}

fn write_xodr(path: &Path, roads: &[String]) {
    let xml = format!(
        "<?xml version=\"1.0\"?>\n<OpenDRIVE><header revMajor=\"1\" revMinor=\"4\"/>{}</OpenDRIVE>",
        roads.concat()
    );
    std::fs::write(path, xml).unwrap();
}

#[test]
fn test_directory_conversion() {
    let root = scratch_dir("batch");
    let input_dir = root.join("opendrive");
    std::fs::create_dir_all(&input_dir).unwrap();

    write_xodr(&input_dir.join("a.xodr"), &[straight_road("1", 5), straight_road("2", 2)]);
    write_xodr(&input_dir.join("b.xodr"), &[straight_road("9", 4)]);
    std::fs::write(
        input_dir.join("broken.xodr"),
        r#"<OpenDRIVE><road id="5" length="long"></road></OpenDRIVE>"#,
    )
    .unwrap();
    std::fs::write(input_dir.join("notes.txt"), "not a road").unwrap();

    let config = ConverterConfig {
        input_dir,
        output_dir: root.join("road_data"),
        samples_per_segment: 3,
        ..ConverterConfig::default()
    };
    let summary = process_directory(&config).unwrap();
    assert_eq!(summary.files, 3);
    assert_eq!(summary.roads_written, 2);
    assert_eq!(summary.roads_skipped, 1);
    assert_eq!(summary.failed_files, 1);

    // Two roads in a.xodr, so its output carries the road id.
    let spline = load_road_data(&config.output_dir.join("a_1.json")).unwrap();
    assert_eq!(spline.len(), (5 - 3) * 3);
    assert_abs_diff_eq!(spline[0].x, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(spline[5].x, 30.0, epsilon = 1e-9);
    for p in &spline {
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-9);
        assert_eq!(p.z, 2.0);
        assert_eq!(p.width, 3.5);
    }
    assert!(!config.output_dir.join("a_2.json").exists());

    let spline = load_road_data(&config.output_dir.join("b.json")).unwrap();
    assert_eq!(spline.len(), 3);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_output_json_layout() {
    let root = scratch_dir("layout");
    let input_dir = root.join("opendrive");
    std::fs::create_dir_all(&input_dir).unwrap();
    write_xodr(&input_dir.join("road.xodr"), &[straight_road("0", 4)]);

    let config = ConverterConfig {
        input_dir,
        output_dir: root.join("out"),
        ..ConverterConfig::default()
    };
    process_directory(&config).unwrap();

    let raw = std::fs::read_to_string(config.output_dir.join("road.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].as_array().unwrap().len(), 4);

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_campaign_json_to_spline() {
    let root = scratch_dir("campaign");
    let geometry = |i: usize| {
        format!(
            r#"{{"@s": "{s}", "@x": "{s}", "@y": "0.0", "@hdg": "0.0", "@length": "10.0",
                "paramPoly3": {{"@pRange": "arcLength", "@aU": "0", "@bU": "1", "@cU": "0", "@dU": "0",
                                "@aV": "0", "@bV": "0", "@cV": "0", "@dV": "0"}}}}"#,
            s = i * 10
        )
    };
    let geometries: Vec<String> = (0..6).map(geometry).collect();
    let campaign = format!(
        r#"[{{"OpenDRIVE": {{"road": {{
            "@id": "12", "@length": "60.0",
            "planView": {{"geometry": [{}]}},
            "lanes": {{"laneSection": {{"@s": "0.0",
                "left": {{"lane": {{"@id": "1", "@type": "driving", "@level": "false", "width": {{"@a": "4.0"}}}}}},
                "right": {{"lane": {{"@id": "-1", "@type": "driving", "@level": "false", "width": {{"@a": "4.0"}}}}}}
            }}}}
        }}}}}}]"#,
        geometries.join(",")
    );
    let json_file = root.join("campaign.json");
    std::fs::write(&json_file, campaign).unwrap();

    let input_dir = root.join("xodr");
    let written = convert_json_to_opendrive(&json_file, &input_dir).unwrap();
    assert_eq!(written, vec![input_dir.join("12.xodr")]);

    let config = ConverterConfig {
        input_dir,
        output_dir: root.join("road_data"),
        samples_per_segment: 2,
        ..ConverterConfig::default()
    };
    let summary = process_directory(&config).unwrap();
    assert_eq!(summary.roads_written, 1);

    let spline = load_road_data(&config.output_dir.join("12.json")).unwrap();
    assert_eq!(spline.len(), (6 - 3) * 2);
    assert_abs_diff_eq!(spline[0].x, 10.0, epsilon = 1e-9);
    assert!(spline.iter().all(|p| p.width == 4.0 && p.z == 0.0));

    std::fs::remove_dir_all(&root).unwrap();
}
