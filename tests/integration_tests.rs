//! Integration tests for TransBOM
//!
//! Drive the conversion and annotation pipelines end-to-end over files in a
//! temporary directory.

use std::{fs, path::PathBuf};
use tempfile::TempDir;
use TransBOM::{
    annotate::{PartPrompt, PromptAnswer},
    bom::{self, ComponentRecord},
    config::{AnnotateOptions, ConvertOptions},
    converter::{self, Converter, BOM_OUTPUT_NAME, CPL_OUTPUT_NAME},
    error::Result,
    mapping,
};

const KICAD_BOM: &str = r#""Id";"Designator";"Footprint";"Quantity";"Designation";"Supplier and ref";
1;"C3,C1,C12";"C_0805_2012Metric";3;"100nF";;
2;"R10,R2";"R_0603_1608Metric";2;"10k";;
3;"";"";0;"Logo";;
4;"TP2,TP1";"TestPoint_Pad_D1.0mm";2;"TestPoint";;
5;"U1";"SOT-23-6";1;"USBLC6-2SC6";;
6;"J2";"PinHeader_1x01";1;"GND";;
"#;

const TOP_POS: &str = "### Footprint positions - created on 2025-01-01 ###
### Printed by KiCad version 8.0
## Unit = mm, Angle = deg.
## Side : top
# Ref     Val          Package                 PosX       PosY       Rot  Side
R2        10k          R_0603_1608Metric    10.0000   12.5000   -90.0000  top
R5        10k          R_0603_1608Metric    11.0000   -3.0000    45.5000  top
## End
";

const BOTTOM_POS: &str = "### Footprint positions - created on 2025-01-01 ###
## Side : bottom
# Ref     Val          Package                 PosX       PosY       Rot  Side
R3        10k          R_0603_1608Metric     5.0000    6.0000   180.0000  bottom
R1        10k          R_0603_1608Metric     1.0000    2.0000     0.0000  bottom
broken    line
## End
";

/// Create a temporary directory with test files
fn create_test_files(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    for (filename, content) in files {
        let file_path = temp_dir.path().join(filename);
        fs::write(file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn convert_options(temp_dir: &TempDir, positions: &[&str]) -> ConvertOptions {
    ConvertOptions {
        bom: temp_dir.path().join("bom.csv"),
        positions: positions
            .iter()
            .map(|name| temp_dir.path().join(name))
            .collect(),
        output_path: temp_dir.path().join("output"),
    }
}

fn run_convert(temp_dir: &TempDir, positions: &[&str]) -> (String, String) {
    let options = convert_options(temp_dir, positions);
    fs::create_dir_all(&options.output_path).expect("Failed to create output dir");

    Converter::new(options.clone(), false)
        .run()
        .expect("Conversion should succeed");

    let bom = fs::read_to_string(options.output_path.join(BOM_OUTPUT_NAME)).expect("BOM output");
    let cpl = fs::read_to_string(options.output_path.join(CPL_OUTPUT_NAME)).expect("CPL output");
    (bom, cpl)
}

#[test]
fn test_bom_conversion() {
    let temp_dir = create_test_files(&[("bom.csv", KICAD_BOM), ("top.pos", TOP_POS)]);
    let (bom, _) = run_convert(&temp_dir, &["top.pos"]);

    let lines: Vec<&str> = bom.lines().collect();
    assert_eq!(lines[0], "Comment,Designator,Footprint,JLCPCB Part #");
    assert_eq!(lines[1], "100nF,\"C1,C3,C12\",C_0805_2012Metric,");
    assert_eq!(lines[2], "10k,\"R2,R10\",R_0603_1608Metric,");

    // The row without designators is dropped
    assert_eq!(lines.len(), 6);
    assert!(!bom.contains("Logo"));
    assert!(bom.ends_with("\r\n"));
}

#[test]
fn test_placement_merge_is_global() {
    let temp_dir = create_test_files(&[
        ("bom.csv", KICAD_BOM),
        ("top.pos", TOP_POS),
        ("bottom.pos", BOTTOM_POS),
    ]);
    let (_, cpl) = run_convert(&temp_dir, &["top.pos", "bottom.pos"]);

    let lines: Vec<&str> = cpl.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Designator,Mid X,Mid Y,Layer,Rotation",
            "R1,1.0000mm,-2.0000mm,Bottom,0",
            "R2,10.0000mm,-12.5000mm,Top,270",
            "R3,5.0000mm,-6.0000mm,Bottom,180",
            "R5,11.0000mm,3.0000mm,Top,45.5",
        ]
    );
}

#[test]
fn test_conversion_is_idempotent() {
    let temp_dir = create_test_files(&[
        ("bom.csv", KICAD_BOM),
        ("top.pos", TOP_POS),
        ("bottom.pos", BOTTOM_POS),
    ]);

    let first = run_convert(&temp_dir, &["top.pos", "bottom.pos"]);
    let second = run_convert(&temp_dir, &["top.pos", "bottom.pos"]);

    assert_eq!(first, second);
}

#[test]
fn test_invalid_coordinate_is_fatal() {
    let temp_dir = create_test_files(&[
        ("bom.csv", KICAD_BOM),
        ("top.pos", "R1 10k R_0603 1.0 north 0 top\n"),
    ]);
    let options = convert_options(&temp_dir, &["top.pos"]);
    fs::create_dir_all(&options.output_path).expect("Failed to create output dir");

    let err = Converter::new(options, false)
        .run()
        .expect_err("bad coordinate should fail");
    let message = format!("{:#}", err);

    assert!(message.contains("top.pos"));
    assert!(message.contains("north"));
}

fn write_converted_bom(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join(BOM_OUTPUT_NAME);
    let records = bom::parse_kicad_bom(KICAD_BOM.as_bytes()).expect("BOM should parse");
    bom::write_jlc_bom_file(&path, &records).expect("BOM should be written");
    path
}

fn annotate_options(temp_dir: &TempDir, bom: PathBuf) -> AnnotateOptions {
    AnnotateOptions {
        bom,
        mapping: None,
        interactive: false,
        filter_test_points: false,
        exclusions: None,
        output: temp_dir.path().join("annotated.csv"),
    }
}

#[test]
fn test_annotate_with_mapping_and_filter() {
    let temp_dir = create_test_files(&[(
        "map.json",
        r##"{"# PASSIVES": null, "100nF": "C49678", "10k": "C25804"}"##,
    )]);
    let bom_path = write_converted_bom(&temp_dir);

    let mut options = annotate_options(&temp_dir, bom_path);
    options.mapping = Some(temp_dir.path().join("map.json"));
    options.filter_test_points = true;

    let report = converter::annotate(&options, None).expect("Annotation should succeed");

    // TestPoint and GND rows are filtered out
    assert_eq!(report.total, 3);
    assert_eq!(report.with_part, 2);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].comment, "USBLC6-2SC6");

    let records = bom::read_jlc_bom(&options.output).expect("Annotated BOM should parse");
    assert_eq!(records[0].part, "C49678");
    assert_eq!(records[1].part, "C25804");
    assert_eq!(records[2].part, "");
}

#[test]
fn test_annotate_with_custom_exclusions() {
    let temp_dir = create_test_files(&[("exclude.json", r#"{"prefixes": ["U"]}"#)]);
    let bom_path = write_converted_bom(&temp_dir);

    let mut options = annotate_options(&temp_dir, bom_path);
    options.filter_test_points = true;
    options.exclusions = Some(temp_dir.path().join("exclude.json"));

    let report = converter::annotate(&options, None).expect("Annotation should succeed");
    let comments: Vec<&str> = report
        .missing
        .iter()
        .map(|record| record.comment.as_str())
        .collect();

    assert_eq!(comments, vec!["100nF", "10k", "TestPoint", "GND"]);
}

struct FixedPrompt(&'static str);

impl PartPrompt for FixedPrompt {
    fn ask(&mut self, _record: &ComponentRecord) -> Result<PromptAnswer> {
        Ok(PromptAnswer::Part(self.0.to_string()))
    }
}

#[test]
fn test_annotate_with_prompt_fills_remaining() {
    let temp_dir = create_test_files(&[("map.json", r#"{"10k": "C25804"}"#)]);
    let bom_path = write_converted_bom(&temp_dir);

    let mut options = annotate_options(&temp_dir, bom_path);
    options.mapping = Some(temp_dir.path().join("map.json"));
    options.interactive = true;

    let mut prompt = FixedPrompt("C0000");
    let report =
        converter::annotate(&options, Some(&mut prompt)).expect("Annotation should succeed");

    assert_eq!(report.total, 5);
    assert!(report.missing.is_empty());

    let records = bom::read_jlc_bom(&options.output).expect("Annotated BOM should parse");
    assert_eq!(records[1].part, "C25804");
    assert_eq!(records[0].part, "C0000");
}

#[test]
fn test_mapping_template_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("parts_mapping.json");

    let entries = mapping::write_template(&path).expect("Template should be written");
    let loaded = mapping::PartMapping::from_file(&path).expect("Template should load");

    assert_eq!(loaded.len(), entries);
    assert!(!fs::read_to_string(&path)
        .expect("Template exists")
        .contains("# "));
}
