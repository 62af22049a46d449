//! Integration tests for roadcrash.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use roadcrash::stats::{describe, value_counts};
use roadcrash::{
    export, ColumnType, Consolidator, DatasetCache, Encoding, LoadWarning, LoaderConfig,
    PipelineConfig, RoadcrashError, Schema, Value,
};

/// Encode text the way the yearly exports are written.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).expect("latin-1 character"))
        .collect()
}

fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, latin1(content)).expect("Failed to write source file");
    path
}

const SOURCE_2021: &str = "\
data_inversa,dia_semana,causa_acidente,mortos
01/01/2021,sexta-feira,Velocidade,0
02/01/2021,sábado,,1
03/01/2021,domingo,Chuva,0
04/01/2021,segunda-feira,Velocidade,2
05/01/2021,terça-feira,Velocidade,0
";

const SOURCE_2022: &str = "\
data_inversa;dia_semana;causa_acidente;condicao_metereologica
2022-03-15;terça-feira;Chuva;Nublado
2022-03-16;quarta-feira;Velocidade;Sol
2022-03-16;quarta-feira;Velocidade;Sol
2022-03-17;quinta-feira;Animal;Sol;extra
2022-03-18;sexta-feira;Chuva;
";

const SOURCE_2023: &str = "\
data_inversa|causa_acidente|condicao_metereologica|mortos
10/07/2023|Chuva|Chuva|0
11/07/2023|Velocidade||1
12/07/2023|Animal|Sol|0
13/07/2023|Velocidade|Sol|0
14/07/2023||Nublado|3
";

/// Three yearly files, each with its own delimiter and column set.
fn three_years(dir: &TempDir) -> PipelineConfig {
    PipelineConfig::new([
        ("2021", write_source(dir.path(), "2021.csv", SOURCE_2021)),
        ("2022", write_source(dir.path(), "2022.csv", SOURCE_2022)),
        ("2023", write_source(dir.path(), "2023.csv", SOURCE_2023)),
    ])
}

// =============================================================================
// End-to-end Consolidation
// =============================================================================

#[test]
fn test_three_years_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = three_years(&dir).with_schema(Schema::road_police().with_year_column("year"));
    let result = Consolidator::new(config)
        .consolidate()
        .expect("Consolidation failed");
    let table = &result.table;
    let report = &result.report;

    // 5 + (5 - malformed - duplicate) + 5
    assert_eq!(table.row_count(), 13);
    assert_eq!(report.rows_skipped(), 1);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.files_failed(), 0);

    let delimiters: Vec<char> = report.sources.iter().map(|s| s.delimiter).collect();
    assert_eq!(delimiters, vec![',', ';', '|']);

    // Malformed row absent.
    let march_17 = chrono::NaiveDate::from_ymd_opt(2022, 3, 17).unwrap();
    assert!(table
        .column_by_name("data_inversa")
        .unwrap()
        .iter()
        .all(|v| v.as_date() != Some(march_17)));

    // Every text column complete.
    for (index, column) in table.columns().iter().enumerate() {
        if column.column_type == ColumnType::String {
            assert_eq!(table.missing_count(index), 0, "gaps left in '{}'", column.name);
        }
    }

    // Year derived from each row's own date.
    assert!(report.year_derived);
    let years: Vec<i64> = table
        .column_by_name("year")
        .unwrap()
        .iter()
        .map(|v| v.as_i64().expect("year present"))
        .collect();
    let mut expected = vec![2021; 5];
    expected.extend([2022; 3]);
    expected.extend([2023; 5]);
    assert_eq!(years, expected);
}

#[test]
fn test_column_union_and_imputation_across_years() {
    let dir = TempDir::new().unwrap();
    let result = Consolidator::new(three_years(&dir)).consolidate().unwrap();
    let table = &result.table;

    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec![
            "data_inversa",
            "dia_semana",
            "causa_acidente",
            "mortos",
            "condicao_metereologica",
            "ano",
        ]
    );

    // Numeric column keeps its gaps for the year that lacks it.
    assert_eq!(table.column_type("mortos"), Some(ColumnType::Integer));
    assert_eq!(table.value(5, "mortos"), Some(&Value::Missing));
    assert_eq!(table.value(1, "mortos"), Some(&Value::Integer(1)));

    // 2023 had no weekday column: filled with the consolidated mode.
    // quarta, sexta and terça tie at two occurrences each.
    assert_eq!(
        table.value(12, "dia_semana"),
        Some(&Value::Text("quarta-feira".into()))
    );
    // 2021 had no weather column.
    assert_eq!(
        table.value(0, "condicao_metereologica"),
        Some(&Value::Text("Sol".into()))
    );
    // Latin-1 bytes decoded.
    assert_eq!(table.value(1, "dia_semana"), Some(&Value::Text("sábado".into())));
}

#[test]
fn test_missing_year_file_is_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    let mut config = three_years(&dir);
    config
        .sources
        .insert("2024".to_string(), dir.path().join("2024.csv"));

    let result = Consolidator::new(config).consolidate().unwrap();
    assert_eq!(result.report.files_failed(), 1);
    assert_eq!(result.report.sources.len(), 3);
    assert!(result.report.warnings.iter().any(|w| matches!(
        w,
        LoadWarning::FileLoad { year, .. } if year == "2024"
    )));
}

#[test]
fn test_all_sources_failing_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::new([
        ("2021", dir.path().join("2021.csv")),
        ("2022", dir.path().join("2022.csv")),
    ]);

    let err = Consolidator::new(config).consolidate().unwrap_err();
    assert!(matches!(err, RoadcrashError::NoDataLoaded { attempted: 2 }));
    assert!(err.to_string().contains("No data loaded"));
}

#[test]
fn test_encoding_failure_drops_only_that_file() {
    let dir = TempDir::new().unwrap();
    let config = three_years(&dir).with_loader(LoaderConfig {
        encoding: Encoding::Utf8,
        ..LoaderConfig::default()
    });

    // 2021 and 2022 contain latin-1 accents; 2023 is plain ASCII.
    let result = Consolidator::new(config).consolidate().unwrap();
    assert_eq!(result.report.files_failed(), 2);
    assert_eq!(result.report.sources.len(), 1);
    assert_eq!(result.table.row_count(), 5);
}

#[test]
fn test_repeated_header_keeps_both_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_source(
        dir.path(),
        "2021.csv",
        "data_inversa,causa,causa\n01/01/2021,Chuva,Sono\n02/01/2021,Animal,Chuva\n03/01/2021,Sono,Sono\n04/01/2021,Chuva,Animal\n",
    );

    let result = Consolidator::new(PipelineConfig::new([("2021", path)]))
        .consolidate()
        .unwrap();
    let table = &result.table;

    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["data_inversa", "causa", "causa.1", "ano"]
    );
    assert_eq!(table.value(0, "causa"), Some(&Value::Text("Chuva".into())));
    assert_eq!(table.value(0, "causa.1"), Some(&Value::Text("Sono".into())));
}

// =============================================================================
// Explicit Year Column
// =============================================================================

#[test]
fn test_existing_year_column_is_kept() {
    let dir = TempDir::new().unwrap();
    let path = write_source(
        dir.path(),
        "2020.csv",
        "date;year;cause\n15/03/2022;2020;rain\n16/03/2022;2020;fog\nbad;2020;rain\n17/03/2022;2020;sun\n",
    );
    let config = PipelineConfig::new([("2020", path)])
        .with_schema(Schema::empty().with_date_column("date").with_year_column("year"));

    let result = Consolidator::new(config).consolidate().unwrap();
    assert!(!result.report.year_derived);
    assert_eq!(result.table.distinct_years("year"), vec![2020]);
    assert_eq!(result.table.value(2, "date"), Some(&Value::Missing));
    assert_eq!(result.report.dates_unparsed, 1);
}

// =============================================================================
// Handoff to the Presentation Layer
// =============================================================================

#[test]
fn test_export_and_summarize() {
    let dir = TempDir::new().unwrap();
    let config = three_years(&dir);
    let result = Consolidator::new(config.clone()).consolidate().unwrap();

    let out = dir.path().join("accidents_cleaned.csv");
    export::write_csv(&result.table, &out).unwrap();
    let reloaded = export::read_csv(&out, &config.cleaning, &config.schema).unwrap();

    assert_eq!(reloaded, result.table);

    let view = reloaded.filter_years("ano", &[2023]);
    assert_eq!(view.row_count(), 5);

    let summaries = describe(&view);
    let mortos = summaries.iter().find(|s| s.column == "mortos").unwrap();
    assert_eq!(mortos.count, 5);
    assert_eq!(mortos.max, Some(3.0));

    let causes = value_counts(&view, "causa_acidente").unwrap();
    assert_eq!(causes[0].value, "Velocidade");
}

#[test]
fn test_cache_serves_repeat_requests() {
    let dir = TempDir::new().unwrap();
    let config = three_years(&dir);
    let mut cache = DatasetCache::new();

    let first = cache.get_or_consolidate(&config).unwrap();
    let second = cache.get_or_consolidate(&config).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let mut narrower = config.clone();
    narrower.sources.shift_remove("2023");
    let third = cache.get_or_consolidate(&narrower).unwrap();
    assert_eq!(third.table.row_count(), 8);
    assert_eq!(cache.len(), 2);
}
