//! End-to-end tests: files on disk through the pipeline

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use museum_eda::config::{museum_presets, CollectionConfig, ReportConfig};
use museum_eda::pipeline::{CollectionOutcome, Pipeline};
use museum_eda::summary::DistributionTable;
use museum_eda::temporal::TemporalValue;
use museum_eda::Error;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, contents: &str) {
    let mut file = File::create(dir.join(name)).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

fn write_museum_files(dir: &Path) {
    write_file(
        dir,
        "cleveland.csv",
        "id,artists_tags,department,creation_date_earliest,creation_date_latest\n\
         1,Monet,Modern European Painting,1872,1872\n\
         2,,Egyptian Art,-1390,-1352\n\
         3,Monet,Modern European Painting,1890,1891\n\
         4,Hokusai,Japanese Art,,1831\n",
    );
    write_file(
        dir,
        "met_objects.csv",
        "Object ID,Department,Artist Display Name,Artist Nationality,Object Begin Date,Object End Date\n\
         10,Drawings and Prints,Rembrandt,Dutch,1630,1635\n\
         11,European Paintings,Vermeer,Dutch,1665,1667\n\
         12,Drawings and Prints,,,1400,1500\n",
    );
    write_file(
        dir,
        "moma_artists.csv",
        "ConstituentID,DisplayName,Nationality,Gender,BeginDate\n\
         1,Robert Arneson,American,Male,1930\n\
         2,Doroteo Arnaiz,Spanish,Male,1936\n\
         3,Bill Arnold,American,Male,1941\n\
         4,Charles Arnoldi,American,Female,1946\n\
         5,Per Arnoldi,Danish,,0\n",
    );
    write_file(
        dir,
        "moma_artworks.csv",
        "Title,ConstituentID,Medium,DateAcquired\n\
         Ferdinandsbrücke Project,6210,Ink and cut-and-pasted painted pages,1996-04-09\n\
         City of Music,7470,Paint and colored pencil on print,1995-01-17\n\
         Villa,7605,Graphite,1997-01-15\n\
         Untitled,7605,Graphite,\n",
    );
}

#[test]
fn test_presets_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_museum_files(dir.path());

    let report = Pipeline::new().run(&museum_presets(dir.path()));
    assert_eq!(report.failures().count(), 0);

    let cleveland = report.outcome("Cleveland").unwrap().report().unwrap();
    assert_eq!(cleveland.summary.total_count, 4);
    assert_eq!(cleveland.summary.distinct_count, 2);
    assert_eq!(cleveland.summary.earliest, Some(TemporalValue::Year(-1390)));
    assert_eq!(cleveland.summary.latest, Some(TemporalValue::Year(1891)));

    match cleveland.distribution("departments").unwrap() {
        DistributionTable::Categorical(dist) => {
            assert_eq!(dist.entries()[0].label, "Modern European Painting");
            assert_eq!(dist.entries()[0].count, 2);
        }
        other => panic!("expected categorical, got {other:?}"),
    }
    match cleveland.distribution("centuries").unwrap() {
        DistributionTable::Binned(dist) => {
            let bins: Vec<_> = dist.iter().map(|e| (e.label, e.count)).collect();
            assert_eq!(bins, vec![(-1400, 1), (1800, 2)]);
        }
        other => panic!("expected binned, got {other:?}"),
    }

    let artists = report.outcome("MoMA Artists").unwrap().report().unwrap();
    assert_eq!(artists.summary.distinct_count, 5);
    assert_eq!(artists.summary.distinct_count, artists.summary.total_count);
    match artists.distribution("genders").unwrap() {
        DistributionTable::Normalized(dist) => {
            assert_eq!(dist.total(), 4);
            assert!((dist.entries()[0].fraction - 0.75).abs() < 1e-12);
        }
        other => panic!("expected normalized, got {other:?}"),
    }

    let artworks = report.outcome("MoMA Artworks").unwrap().report().unwrap();
    assert_eq!(artworks.summary.distinct_count, 3);
    assert!(artworks.warnings.is_empty());

    let table = report.comparison.as_ref().unwrap();
    let names: Vec<_> = table.rows().iter().map(|r| r.collection.as_str()).collect();
    assert_eq!(names, vec!["Cleveland", "Met", "MoMA Artists", "MoMA Artworks"]);
}

#[test]
fn test_missing_file_is_isolated() {
    let dir = TempDir::new().unwrap();
    write_museum_files(dir.path());
    std::fs::remove_file(dir.path().join("met_objects.csv")).unwrap();

    let report = Pipeline::new().run(&museum_presets(dir.path()));

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "Met");
    assert!(matches!(failures[0].1, Error::Load { .. }));

    assert_eq!(report.reports().count(), 3);
    let table = report.comparison.as_ref().unwrap();
    assert_eq!(table.len(), 3);
    assert!(table.get("Met").is_none());
}

#[test]
fn test_extreme_year_values_do_not_abort_run() {
    let dir = TempDir::new().unwrap();
    write_museum_files(dir.path());
    write_file(
        dir.path(),
        "cleveland.csv",
        "id,artists_tags,department,creation_date_earliest,creation_date_latest\n\
         1,Monet,Modern European Painting,1872,9223372036854775807\n\
         2,Hokusai,Japanese Art,-1e19,1831\n",
    );

    let report = Pipeline::new().run(&museum_presets(dir.path()));
    assert_eq!(report.failures().count(), 0);

    let cleveland = report.outcome("Cleveland").unwrap().report().unwrap();
    assert_eq!(cleveland.summary.earliest, Some(TemporalValue::Year(1872)));
    assert_eq!(cleveland.summary.latest, Some(TemporalValue::Year(1831)));
    assert_eq!(cleveland.distribution("centuries").unwrap().len(), 1);
    assert_eq!(report.comparison.as_ref().unwrap().len(), 4);
}

#[test]
fn test_missing_role_column_is_reported() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "cleveland.csv", "id,department\n1,Prints\n");

    let config = CollectionConfig::builder("Cleveland", dir.path().join("cleveland.csv"), "artists_tags")
        .categorical("departments", "department", None)
        .build();
    let report = Pipeline::new().run(&[config]);

    match report.outcome("Cleveland").unwrap() {
        CollectionOutcome::Failed { error, .. } => match error {
            Error::MissingColumn { collection, column } => {
                assert_eq!(collection, "Cleveland");
                assert_eq!(column, "artists_tags");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        },
        CollectionOutcome::Summarized(_) => panic!("expected failure"),
    }
    assert!(report.comparison.unwrap().is_empty());
}

#[test]
fn test_parquet_collection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("objects.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("artist", DataType::Utf8, true),
        Field::new("year", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec![Some("Goya"), None, Some("Goya")])) as ArrayRef,
            Arc::new(Int64Array::from(vec![Some(1799), Some(1810), None])) as ArrayRef,
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let config = CollectionConfig::builder("Prado", &path, "artist")
        .date_column("year")
        .binned("decades", "year", 10)
        .build();
    let report = Pipeline::new().process(&config).unwrap();

    assert_eq!(report.summary.total_count, 3);
    assert_eq!(report.summary.distinct_count, 1);
    assert_eq!(report.summary.earliest, Some(TemporalValue::Year(1799)));
    assert_eq!(report.summary.latest, Some(TemporalValue::Year(1810)));
    assert_eq!(report.distribution("decades").unwrap().len(), 2);
}

#[cfg(feature = "rayon")]
#[test]
fn test_parallel_matches_sequential() {
    let dir = TempDir::new().unwrap();
    write_museum_files(dir.path());
    std::fs::remove_file(dir.path().join("moma_artists.csv")).unwrap();
    let configs = museum_presets(dir.path());

    let sequential = Pipeline::new().run(&configs);
    let parallel = Pipeline::new().run_parallel(&configs);

    assert_eq!(sequential.to_json().unwrap(), parallel.to_json().unwrap());
}

#[test]
fn test_report_json() {
    let dir = TempDir::new().unwrap();
    write_museum_files(dir.path());
    std::fs::remove_file(dir.path().join("moma_artworks.csv")).unwrap();

    let report = Pipeline::new().run(&museum_presets(dir.path()));
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    let collections = json["collections"].as_array().unwrap();
    assert_eq!(collections.len(), 4);
    assert_eq!(collections[0]["status"], "summarized");
    assert_eq!(collections[0]["summary"]["collection"], "Cleveland");
    assert_eq!(collections[3]["status"], "failed");
    assert_eq!(collections[3]["collection"], "MoMA Artworks");
    assert_eq!(json["comparison"]["rows"].as_array().unwrap().len(), 3);
}

#[test]
fn test_report_config_from_path() {
    let dir = TempDir::new().unwrap();
    write_museum_files(dir.path());
    write_file(
        dir.path(),
        "report.json",
        r#"{
          "collections": [{
            "name": "MoMA Artworks",
            "path": "moma_artworks.csv",
            "roles": { "identity": "ConstituentID", "date_earliest": "DateAcquired" },
            "distributions": [
              { "name": "mediums", "kind": "categorical", "column": "Medium", "top_n": 1 }
            ]
          }]
        }"#,
    );

    let config = ReportConfig::from_path(dir.path().join("report.json")).unwrap();
    assert_eq!(config.collections[0].path, dir.path().join("moma_artworks.csv"));

    let report = Pipeline::new().run_report(&config);
    let artworks = report.outcome("MoMA Artworks").unwrap().report().unwrap();
    assert_eq!(artworks.summary.earliest.unwrap().year(), 1995);
    assert_eq!(artworks.summary.latest.unwrap().year(), 1997);

    match artworks.distribution("mediums").unwrap() {
        DistributionTable::Categorical(dist) => {
            assert_eq!(dist.len(), 1);
            assert_eq!(dist.entries()[0].label, "Graphite");
        }
        other => panic!("expected categorical, got {other:?}"),
    }
}

#[test]
fn test_report_config_rejects_duplicates() {
    let json = r#"{
      "collections": [
        { "name": "Met", "path": "a.csv", "roles": { "identity": "x" } },
        { "name": "Met", "path": "b.csv", "roles": { "identity": "x" } }
      ]
    }"#;
    assert!(matches!(ReportConfig::from_json_str(json), Err(Error::Config(_))));
}
