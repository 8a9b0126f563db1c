// tests/export_roundtrip.rs
//
// Export to disk and read back, per format.

mod common;

use std::fs;

use common::tmp_dir;
use scorecard::file::{export_table, import_table, read_table_str};
use scorecard::{Cell, ExportFormat, ExportOptions, RecordId, ResultTable, ScorecardError};

fn sample() -> ResultTable {
    let mut t = ResultTable::new(vec![
        "school.name".into(),
        "latest.student.size".into(),
        "latest.cost.avg".into(),
        "school.online_only".into(),
    ]);
    t.push_row(RecordId::Int(100654), vec![
        Cell::Text("Alabama A & M University".into()),
        Cell::Int(5271),
        Cell::Float(23445.0),
        Cell::Bool(false),
    ])
    .unwrap();
    t.push_row(RecordId::Int(100663), vec![
        Cell::Text("Birmingham, \"UAB\"".into()),
        Cell::Missing,
        Cell::Float(25542.5),
        Cell::Missing,
    ])
    .unwrap();
    t
}

#[test]
fn csv_roundtrip_keeps_types_and_missing() {
    let dir = tmp_dir("csv_roundtrip");
    let path = dir.join("schools.csv");
    let opts = ExportOptions::for_path(path.to_str().unwrap(), None);
    assert_eq!(opts.format, ExportFormat::Csv);

    let written = export_table(&sample(), &opts).unwrap();
    assert_eq!(written, path);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("id,school.name,latest.student.size,latest.cost.avg,school.online_only\n"));
    assert!(text.contains("\"Birmingham, \"\"UAB\"\"\""));

    assert_eq!(import_table(&path, None).unwrap(), sample());
}

#[test]
fn tsv_roundtrip() {
    let dir = tmp_dir("tsv_roundtrip");
    let path = dir.join("out.tsv");
    export_table(&sample(), &ExportOptions::for_path(path.to_str().unwrap(), None)).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.lines().next().unwrap().split('\t').count() == 5);
    assert_eq!(import_table(&path, None).unwrap(), sample());
}

#[test]
fn json_roundtrip_is_exact() {
    let dir = tmp_dir("json_roundtrip");
    let path = dir.join("dump.json");
    export_table(&sample(), &ExportOptions::for_path(path.to_str().unwrap(), None)).unwrap();

    let back = import_table(&path, None).unwrap();
    assert_eq!(back, sample());
    assert_eq!(back.get(&RecordId::Int(100663), "latest.student.size"), Some(&Cell::Missing));
}

#[test]
fn directory_hint_gets_default_filename() {
    let dir = tmp_dir("dir_hint");
    let hint = format!("{}/nested/", dir.display());
    let opts = ExportOptions::for_path(&hint, Some(ExportFormat::Tsv));

    let written = export_table(&sample(), &opts).unwrap();
    assert_eq!(written, dir.join("nested").join("schools.tsv"));
    assert!(written.is_file());
}

#[test]
fn import_rejects_bad_inputs() {
    assert!(matches!(
        read_table_str("name,size\nA,1\n", ExportFormat::Csv),
        Err(ScorecardError::InvalidTable(_))
    ));
    assert!(matches!(read_table_str("", ExportFormat::Csv), Err(ScorecardError::InvalidTable(_))));
    assert!(matches!(
        read_table_str("id,a\n1,x\n1,y\n", ExportFormat::Csv),
        Err(ScorecardError::InvalidTable(_))
    ));
    assert!(matches!(
        read_table_str(r#"{"id": 1}"#, ExportFormat::Json),
        Err(ScorecardError::InvalidTable(_))
    ));
    assert!(matches!(
        read_table_str(r#"[{"name": "no id"}]"#, ExportFormat::Json),
        Err(ScorecardError::InvalidTable(_))
    ));

    let dir = tmp_dir("import_unknown_ext");
    let path = dir.join("data.xlsx");
    fs::write(&path, "id\n1\n").unwrap();
    assert!(matches!(import_table(&path, None), Err(ScorecardError::InvalidTable(_))));
    assert_eq!(import_table(&path, Some(ExportFormat::Csv)).unwrap().len(), 1);
}

#[test]
fn filtered_table_exports_only_matching_rows() {
    let t = sample().filter(&"latest.cost.avg__range=25000..".parse().unwrap()).unwrap();
    assert_eq!(t.index(), [RecordId::Int(100663)]);

    let dir = tmp_dir("filtered_export");
    let path = export_table(&t, &ExportOptions::for_path(dir.join("f.csv").to_str().unwrap(), None)).unwrap();
    assert_eq!(import_table(&path, None).unwrap(), t);
}
