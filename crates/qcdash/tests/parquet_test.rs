//! Parquet upload tests.

#![cfg(feature = "parquet")]

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int32Array, StringArray, StructArray};
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::Builder;

use qcdash::{ColumnType, Dashboard, FilterSpec, Value};

/// Encode a small QC table as Parquet.
fn qc_parquet(samples: &[&str], q30: &[Option<f64>]) -> Vec<u8> {
    let n = samples.len();
    let schema = Arc::new(Schema::new(vec![
        Field::new("Sample_Name", DataType::Utf8, false),
        Field::new("Machine", DataType::Utf8, false),
        Field::new("Q30", DataType::Float64, true),
        Field::new("Total_Yield", DataType::Int32, false),
        Field::new("Passed", DataType::Boolean, false),
    ]));

    let machines: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "NovaSeq" } else { "MiSeq" }).collect();
    let yields: Vec<i32> = (0..n).map(|i| 1000 + i as i32).collect();
    let passed: Vec<bool> = (0..n).map(|i| i % 3 != 0).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(samples.to_vec())),
        Arc::new(StringArray::from(machines)),
        Arc::new(Float64Array::from(q30.to_vec())),
        Arc::new(Int32Array::from(yields)),
        Arc::new(BooleanArray::from(passed)),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    buffer
}

#[test]
fn test_parquet_upload_is_sniffed() {
    let bytes = qc_parquet(
        &["S1", "S2", "S3", "S4"],
        &[Some(90.0), Some(85.0), None, Some(f64::NAN)],
    );

    let dash = Dashboard::new();
    let summary = dash.load_baseline_bytes(&bytes, None).unwrap();
    assert_eq!(summary.source.format, "parquet");
    assert_eq!(summary.total_row_count, 4);
    assert_eq!(summary.numerical_columns, vec!["Q30", "Total_Yield"]);
    assert_eq!(summary.categorical_columns, vec!["Machine", "Passed"]);
    assert_eq!(summary.filter_options["Passed"], vec!["All", "false", "true"]);

    let stats = dash.stats(&FilterSpec::new()).unwrap();
    assert_eq!(stats["Q30"].points, vec![90.0, 85.0]);
    assert_eq!(stats["Total_Yield"].count, 4);
}

#[test]
fn test_parquet_file_on_disk() {
    let bytes = qc_parquet(&["S1", "S2", "S3"], &[Some(91.0), Some(92.0), Some(93.0)]);
    let file = Builder::new().suffix(".parquet").tempfile().unwrap();
    std::fs::write(file.path(), &bytes).unwrap();

    let dash = Dashboard::new();
    dash.load_baseline_path(file.path()).unwrap();

    let baseline = dash.baseline().unwrap();
    let schema = baseline.dataset.schema();
    assert_eq!(schema.get_column("Total_Yield").unwrap().column_type, ColumnType::Integer);
    assert_eq!(schema.get_column("Passed").unwrap().column_type, ColumnType::Boolean);

    let result = dash.query(&FilterSpec::new().with("Passed", "true")).unwrap();
    let names: Vec<&Value> = result.rows.iter().map(|r| &r["Sample_Name"]).collect();
    assert_eq!(names, vec![&Value::Text("S2".into()), &Value::Text("S3".into())]);
}

#[test]
fn test_csv_baseline_with_parquet_overlay() {
    let csv = "Sample_Name,Machine,Q30,Total_Yield,Passed\n\
               B1,NovaSeq,88.0,900,true\n\
               B2,MiSeq,89.5,950,false\n";
    let overlay = qc_parquet(&["N1", "N2"], &[Some(70.0), Some(99.0)]);

    let dash = Dashboard::new();
    dash.load_baseline_bytes(csv.as_bytes(), Some("baseline.csv")).unwrap();
    dash.load_overlay_bytes(&overlay, Some("overlay.parquet")).unwrap();

    let stats = dash.stats(&FilterSpec::new().with("Machine", "NovaSeq")).unwrap();
    assert_eq!(stats["Q30"].points, vec![88.0]);
    assert_eq!(stats["Q30"].overlay_points.len(), 1);
    assert_eq!(stats["Q30"].overlay_points[0].label, "N1");
}

#[test]
fn test_nested_column_is_read_as_text() {
    let meta_fields = Fields::from(vec![Field::new("lane", DataType::Int32, false)]);
    let schema = Arc::new(Schema::new(vec![
        Field::new("Sample_Name", DataType::Utf8, false),
        Field::new("Meta", DataType::Struct(meta_fields.clone()), false),
        Field::new("Q30", DataType::Float64, false),
    ]));
    let meta = StructArray::new(
        meta_fields,
        vec![Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef],
        None,
    );
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["S1", "S2"])),
        Arc::new(meta),
        Arc::new(Float64Array::from(vec![90.0, 91.0])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut bytes = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut bytes, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let dash = Dashboard::new();
    let summary = dash.load_baseline_bytes(&bytes, None).unwrap();
    assert_eq!(summary.total_row_count, 2);
    assert_eq!(summary.categorical_columns, vec!["Meta"]);
    assert_eq!(summary.numerical_columns, vec!["Q30"]);

    let result = dash.query(&FilterSpec::new()).unwrap();
    match &result.rows[1]["Meta"] {
        Value::Text(text) => assert!(text.contains('2'), "{text}"),
        other => panic!("expected text, got {other:?}"),
    }
}
