//! End-to-end tests for the Dashboard API against on-disk files.

use std::io::Write;
use tempfile::{Builder, NamedTempFile};

use qcdash::{
    Dashboard, DashboardConfig, DashboardError, FilterSpec, FilterValue, NumericRange, RangeSpec,
    Value,
};

const MACHINES: [&str; 3] = ["NovaSeq", "MiSeq", "NextSeq"];
const ASSAYS: [(&str, &str); 4] = [
    ("mRNA Enrichment", "25M"),
    ("mRNA Enrichment", "50M"),
    ("rRNA Depletion", "12M"),
    ("Pacbio WGS", "25M"),
];

/// Write content to a temp file with the given suffix.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

/// Deterministic QC table with `rows` samples.
fn qc_table(rows: usize, prefix: &str, delimiter: char) -> String {
    let header = [
        "Sample_Name",
        "Machine",
        "Assay",
        "Desired_Size",
        "Q30",
        "Total_Yield",
        "Pass_Filter",
        "Error_Rate",
        "Cluster_Density",
    ];
    let mut out = header.join(&delimiter.to_string());
    out.push('\n');

    for i in 0..rows {
        let (assay, size) = ASSAYS[i % ASSAYS.len()];
        let fields = [
            format!("{prefix}{:03}", i + 1),
            MACHINES[i % MACHINES.len()].to_string(),
            assay.to_string(),
            size.to_string(),
            format!("{:.1}", 80.0 + (i % 20) as f64),
            format!("{}", 1000 + i * 10),
            format!("{:.2}", 70.0 + (i % 30) as f64 * 0.5),
            format!("{:.2}", 0.1 + (i % 10) as f64 * 0.05),
            format!("{}", 200 + (i % 7) * 3),
        ];
        out.push_str(&fields.join(&delimiter.to_string()));
        out.push('\n');
    }
    out
}

// =============================================================================
// Overlay Reconciliation
// =============================================================================

#[test]
fn test_baseline_and_overlay_counts() {
    let baseline = create_test_file(&qc_table(100, "S", ','), ".csv");
    let overlay = create_test_file(&qc_table(5, "NEW", ','), ".csv");

    let dash = Dashboard::new();
    let summary = dash.load_baseline_path(baseline.path()).unwrap();
    assert_eq!(summary.total_row_count, 100);
    assert_eq!(dash.load_overlay_path(overlay.path()).unwrap().overlay_row_count, 5);

    let all = FilterSpec::new()
        .with("Machine", "All")
        .with("Assay", "All")
        .with("Desired_Size", "All");
    let result = dash.query(&all).unwrap();
    assert_eq!(result.matched_count, 100);
    assert_eq!(result.total_count, 100);
    assert_eq!(result.overlay_matched_count, 5);

    assert!(dash.clear_overlay());
    let result = dash.query(&all).unwrap();
    assert_eq!(result.overlay_matched_count, 0);
    assert!(result.overlay_rows.is_empty());
}

#[test]
fn test_overlay_points_are_labelled_and_do_not_skew_stats() {
    let baseline = create_test_file(&qc_table(40, "S", ','), ".csv");
    let overlay = create_test_file(
        "Sample_Name,Machine,Assay,Desired_Size,Q30,Total_Yield,Pass_Filter,Error_Rate,Cluster_Density\n\
         NEW1,NovaSeq,mRNA Enrichment,25M,10.0,5,50.0,4.9,100\n\
         NEW2,MiSeq,Pacbio WGS,25M,99.5,9000,99.0,0.01,900\n",
        ".csv",
    );

    let dash = Dashboard::new();
    dash.load_baseline_path(baseline.path()).unwrap();
    let before = dash.stats(&FilterSpec::new()).unwrap();
    dash.load_overlay_path(overlay.path()).unwrap();
    let after = dash.stats(&FilterSpec::new()).unwrap();

    for (column, bundle) in &after {
        assert_eq!(bundle.summary, before[column].summary, "{column}");
        assert_eq!(bundle.points, before[column].points, "{column}");
        assert_eq!(bundle.overlay_points.len(), 2, "{column}");
    }

    let q30 = &after["Q30"].overlay_points;
    assert_eq!(q30[0].label, "NEW1");
    assert_eq!(q30[0].value, 10.0);
    assert_eq!(q30[1].label, "NEW2");

    let spec = FilterSpec::new().with("Machine", "MiSeq");
    let filtered = dash.stats(&spec).unwrap();
    let labels: Vec<&str> = filtered["Q30"]
        .overlay_points
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(labels, vec!["NEW2"]);
}

#[test]
fn test_schema_mismatch_keeps_existing_overlay() {
    let baseline = create_test_file(&qc_table(10, "S", ','), ".csv");
    let good = create_test_file(&qc_table(3, "OK", ','), ".csv");
    let bad = create_test_file("Sample_Name,Machine,Q30,Lane\nX1,MiSeq,90,1\n", ".csv");

    let dash = Dashboard::new();
    dash.load_baseline_path(baseline.path()).unwrap();
    dash.load_overlay_path(good.path()).unwrap();

    let err = dash.load_overlay_path(bad.path()).unwrap_err();
    match &err {
        DashboardError::SchemaMismatch { missing, unexpected } => {
            assert!(missing.contains(&"Assay".to_string()));
            assert_eq!(unexpected, &vec!["Lane".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got {other}"),
    }
    assert!(err.to_string().contains("Lane"));

    assert_eq!(dash.query(&FilterSpec::new()).unwrap().overlay_matched_count, 3);
}

#[test]
fn test_overlay_with_reordered_columns_is_accepted() {
    let baseline = create_test_file("Sample_Name,Machine,Q30\nS1,MiSeq,90\nS2,NovaSeq,85\n", ".csv");
    let overlay = create_test_file("Q30,Sample_Name,Machine\n70,N1,MiSeq\n", ".csv");

    let dash = Dashboard::new();
    dash.load_baseline_path(baseline.path()).unwrap();
    dash.load_overlay_path(overlay.path()).unwrap();

    let stats = dash.stats(&FilterSpec::new().with("Machine", "MiSeq")).unwrap();
    assert_eq!(stats["Q30"].points, vec![90.0]);
    assert_eq!(stats["Q30"].overlay_points[0].label, "N1");
    assert_eq!(stats["Q30"].overlay_points[0].value, 70.0);
}

#[test]
fn test_small_overlay_is_read_with_baseline_types() {
    let baseline = create_test_file(
        "Sample_Name,QC_Pass,Q30\nS1,yes,90\nS2,no,85\nS3,pending,88\n",
        ".csv",
    );
    let overlay = create_test_file("Sample_Name,QC_Pass,Q30\nN1,yes,70\nN2,no,75\n", ".csv");

    let dash = Dashboard::new();
    let summary = dash.load_baseline_path(baseline.path()).unwrap();
    assert_eq!(summary.filter_options["QC_Pass"], vec!["All", "no", "pending", "yes"]);
    dash.load_overlay_path(overlay.path()).unwrap();

    let spec = FilterSpec::new().with("QC_Pass", "yes");
    let result = dash.query(&spec).unwrap();
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.overlay_matched_count, 1);
    assert_eq!(result.overlay_rows[0]["QC_Pass"], Value::Text("yes".into()));

    let stats = dash.stats(&spec).unwrap();
    assert_eq!(stats["Q30"].points, vec![90.0]);
    assert_eq!(stats["Q30"].overlay_points.len(), 1);
    assert_eq!(stats["Q30"].overlay_points[0].label, "N1");
}

#[test]
fn test_overlay_before_baseline_fails() {
    let overlay = create_test_file(&qc_table(5, "N", ','), ".csv");
    let dash = Dashboard::new();
    let err = dash.load_overlay_path(overlay.path()).unwrap_err();
    assert!(matches!(err, DashboardError::NoDataLoaded));
}

#[test]
fn test_new_baseline_discards_overlay() {
    let first = create_test_file(&qc_table(10, "S", ','), ".csv");
    let overlay = create_test_file(&qc_table(2, "N", ','), ".csv");
    let second = create_test_file(&qc_table(20, "T", ','), ".csv");

    let dash = Dashboard::new();
    dash.load_baseline_path(first.path()).unwrap();
    dash.load_overlay_path(overlay.path()).unwrap();
    dash.load_baseline_path(second.path()).unwrap();

    assert!(!dash.has_overlay());
    let result = dash.query(&FilterSpec::new()).unwrap();
    assert_eq!(result.total_count, 20);
    assert_eq!(result.overlay_matched_count, 0);
}

// =============================================================================
// Classification and Filtering
// =============================================================================

#[test]
fn test_columns_are_discovered_from_data() {
    let file = create_test_file(&qc_table(12, "S", '\t'), ".tsv");
    let dash = Dashboard::new();
    let summary = dash.load_baseline_path(file.path()).unwrap();

    assert_eq!(summary.source.format, "tsv");
    assert_eq!(summary.categorical_columns, vec!["Machine", "Assay", "Desired_Size"]);
    assert_eq!(
        summary.numerical_columns,
        vec!["Q30", "Total_Yield", "Pass_Filter", "Error_Rate", "Cluster_Density"]
    );
    assert_eq!(
        summary.filter_options["Machine"],
        vec!["All", "MiSeq", "NextSeq", "NovaSeq"]
    );

    let stats = dash.stats(&FilterSpec::new()).unwrap();
    assert!(stats.contains_key("Cluster_Density"));
    assert!(!stats.contains_key("Sample_Name"));
}

#[test]
fn test_query_rows_satisfy_every_constraint() {
    let file = create_test_file(&qc_table(60, "S", ','), ".csv");
    let dash = Dashboard::new();
    dash.load_baseline_path(file.path()).unwrap();

    let spec = FilterSpec::new()
        .with("Machine", "NovaSeq")
        .with("Assay", "mRNA Enrichment");
    let result = dash.query(&spec).unwrap();

    assert_eq!(result.matched_count, result.rows.len());
    assert!(result.matched_count > 0);
    for row in &result.rows {
        assert_eq!(row["Machine"], Value::Text("NovaSeq".into()));
        assert_eq!(row["Assay"], Value::Text("mRNA Enrichment".into()));
    }

    let names: Vec<String> = result.rows.iter().map(|r| r["Sample_Name"].to_string()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted, "rows must keep file order");
}

#[test]
fn test_zero_match_filter_is_empty_not_error() {
    let file = create_test_file(&qc_table(30, "S", ','), ".csv");
    let dash = Dashboard::new();
    dash.load_baseline_path(file.path()).unwrap();

    let spec = FilterSpec::new()
        .with("Assay", "Pacbio WGS")
        .with("Desired_Size", "200M");
    let result = dash.query(&spec).unwrap();
    assert!(result.rows.is_empty());
    assert_eq!(result.matched_count, 0);

    let stats = dash.stats(&spec).unwrap();
    assert_eq!(stats.len(), 5);
    assert!(stats.values().all(|b| b.is_empty() && b.count == 0));
}

#[test]
fn test_unknown_filter_column() {
    let file = create_test_file(&qc_table(5, "S", ','), ".csv");
    let dash = Dashboard::new();
    dash.load_baseline_path(file.path()).unwrap();

    let spec = FilterSpec::new().with("Flowcell", FilterValue::All);
    let err = dash.query(&spec).unwrap_err();
    assert_eq!(err.kind(), "unknown_column");
    assert!(dash.stats(&spec).is_err());
}

#[test]
fn test_stats_are_deterministic() {
    let file = create_test_file(&qc_table(50, "S", ','), ".csv");
    let dash = Dashboard::new();
    dash.load_baseline_path(file.path()).unwrap();

    let spec = FilterSpec::new().with("Machine", "MiSeq");
    let a = serde_json::to_string(&dash.stats(&spec).unwrap()).unwrap();
    let b = serde_json::to_string(&dash.stats(&spec).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_custom_identifier_column() {
    let file = create_test_file("Run_ID,Machine,Q30\nR1,MiSeq,90\nR2,MiSeq,91\n", ".csv");
    let mut config = DashboardConfig::default();
    config.classifier = config.classifier.with_identifier("run_id");

    let dash = Dashboard::with_config(config);
    let summary = dash.load_baseline_path(file.path()).unwrap();
    assert_eq!(summary.identifier_column.as_deref(), Some("Run_ID"));
    assert_eq!(summary.categorical_columns, vec!["Machine"]);
}

// =============================================================================
// Load Failures
// =============================================================================

#[test]
fn test_missing_file_is_io_error() {
    let dash = Dashboard::new();
    let err = dash.load_baseline_path("/nonexistent/qc.csv").unwrap_err();
    assert_eq!(err.kind(), "io");
}

#[test]
fn test_unsupported_extension() {
    let file = create_test_file("a,b\n1,2\n", ".xlsx");
    let err = Dashboard::new().load_baseline_path(file.path()).unwrap_err();
    assert!(matches!(err, DashboardError::UnsupportedFormat(_)));
}

#[test]
fn test_header_only_file_is_schema_error() {
    let file = create_test_file("Sample_Name,Machine,Q30\n", ".csv");
    let err = Dashboard::new().load_baseline_path(file.path()).unwrap_err();
    assert_eq!(err.kind(), "schema");
}

#[test]
fn test_failed_load_leaves_previous_baseline() {
    let good = create_test_file(&qc_table(8, "S", ','), ".csv");
    let empty = create_test_file("", ".csv");

    let dash = Dashboard::new();
    dash.load_baseline_path(good.path()).unwrap();
    assert!(dash.load_baseline_path(empty.path()).is_err());
    assert_eq!(dash.query(&FilterSpec::new()).unwrap().total_count, 8);
}

#[test]
fn test_upload_bytes_records_source() {
    let table = qc_table(4, "S", ';');
    let dash = Dashboard::new();
    let summary = dash.load_baseline_bytes(table.as_bytes(), Some("runs.csv")).unwrap();

    assert_eq!(summary.source.file, "runs.csv");
    assert_eq!(summary.source.format, "csv-semicolon");
    assert_eq!(summary.source.size_bytes, table.len() as u64);
    assert!(summary.source.hash.starts_with("sha256:"));
    assert_eq!(summary.total_row_count, 4);
}

// =============================================================================
// Ranges and Aggregates
// =============================================================================

#[test]
fn test_ranges_and_aggregates_share_the_selection() {
    let file = create_test_file(&qc_table(60, "S", ','), ".csv");
    let dash = Dashboard::new();
    dash.load_baseline_path(file.path()).unwrap();

    let spec = FilterSpec::new().with("Machine", "NovaSeq");
    let ranges = RangeSpec::new().with("Q30", NumericRange::between(85.0, 90.0));

    let result = dash.query_within(&spec, &ranges).unwrap();
    assert!(result.matched_count > 0);
    for row in &result.rows {
        let q30 = row["Q30"].as_f64().unwrap();
        assert!((85.0..=90.0).contains(&q30));
        assert_eq!(row["Machine"], Value::Text("NovaSeq".into()));
    }

    let metrics = dash.metrics(&spec, &ranges).unwrap();
    assert_eq!(metrics["Q30"].count, result.matched_count);

    let counts = dash.value_counts(&spec, &ranges, "Assay").unwrap();
    let counted: usize = counts.iter().map(|c| c.count).sum();
    assert_eq!(counted, result.matched_count);

    let groups = dash.breakdown(&spec, &ranges, "Assay").unwrap();
    let grouped: usize = groups.iter().map(|g| g.rows).sum();
    assert_eq!(grouped, result.matched_count);
    for group in &groups {
        let agg = &group.metrics["Q30"];
        assert!(agg.min.unwrap() >= 85.0 && agg.max.unwrap() <= 90.0);
    }

    let matrix = dash.correlation(&spec, &ranges).unwrap();
    assert_eq!(matrix.columns.len(), metrics.len());
    for (i, row) in matrix.coefficients.iter().enumerate() {
        for (j, r) in row.iter().enumerate() {
            assert_eq!(*r, matrix.coefficients[j][i]);
            if let Some(r) = r {
                assert!((-1.0..=1.0).contains(r));
            }
        }
    }
}
