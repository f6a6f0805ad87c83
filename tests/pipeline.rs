use std::fs;
use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use tempfile::tempdir;

use mobility_panel::config::{MetricDefinition, PipelineConfig};
use mobility_panel::data::columns::{CanonicalField, FieldAliases};
use mobility_panel::data::filter::{Dimension, FilterCriteria, apply};
use mobility_panel::data::loader::load_file;
use mobility_panel::data::model::{Classification, MetricValue};
use mobility_panel::error::{PipelineError, RowError};
use mobility_panel::pipeline::Pipeline;
use mobility_panel::state::{Selection, ViewState};

fn jurdan_config() -> PipelineConfig {
    PipelineConfig {
        metrics: vec![MetricDefinition::new("JURDAN D", 75.0, "cm", &[])],
        ..Default::default()
    }
}

#[test]
fn semicolon_export_with_decimal_commas() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("export.csv");
    fs::write(
        &path,
        "Jugador;CATEGORÍA;Fecha;JURDAN D\n\
         Ana;U17;05/06/2024;76\n\
         Ana;U17;05/06/2024;70,0\n",
    )?;

    let table = load_file(&path, None)?;
    let ds = Pipeline::new(jurdan_config()).run(&table)?;

    let classes: Vec<Classification> = ds
        .records
        .iter()
        .map(|r| r.results[0].classification)
        .collect();
    assert_eq!(classes, [Classification::Pass, Classification::Fail]);
    assert_eq!(ds.records[1].record.metrics["JURDAN D"], MetricValue::Value(70.0));
    assert_eq!(ds.records[0].record.category, "U17");
    Ok(())
}

#[test]
fn rows_without_dates_are_dropped_one_for_one() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("export.csv");
    fs::write(
        &path,
        "Jugador,Fecha,JURDAN D\n\
         Ana,05/06/2024,76\n\
         Luis,,80\n\
         Marta\n\
         Pedro,06/06/2024,\"74,5\"\n",
    )?;

    let table = load_file(&path, None)?;
    assert_eq!(table.records.len(), 4);
    let ds = Pipeline::new(jurdan_config()).run(&table)?;

    assert_eq!(ds.len(), 2);
    assert_eq!(ds.report.dropped.len(), 2);
    assert!(ds
        .report
        .dropped
        .iter()
        .all(|d| matches!(d.reason, RowError::UnparseableDate(_))));
    assert_eq!(ds.records[1].record.subject, "Pedro");
    assert_eq!(ds.records[1].results[0].classification, Classification::Fail);
    Ok(())
}

#[test]
fn custom_alias_table_resolves_spanish_headers() -> Result<()> {
    let config = PipelineConfig::from_toml_str(
        r#"
        [[aliases]]
        field = "subject"
        aliases = ["player", "Nombre"]

        [[aliases]]
        field = "category"
        aliases = ["team", "Grupo"]

        [[aliases]]
        field = "observed_at"
        aliases = ["date", "Fecha Prueba"]
        "#,
    )?;
    let pipeline = Pipeline::new(config);
    let headers: Vec<String> = ["Nombre", "Grupo", "Fecha Prueba"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let res = pipeline.resolve(&headers)?;
    assert_eq!(res.header(CanonicalField::Subject), Some("Nombre"));
    assert_eq!(res.header(CanonicalField::Category), Some("Grupo"));
    assert_eq!(res.header(CanonicalField::ObservedAt), Some("Fecha Prueba"));
    Ok(())
}

#[test]
fn missing_columns_report_present_headers() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("export.csv");
    fs::write(&path, "Equipo,Peso\nU17,60\n")?;

    let table = load_file(&path, None)?;
    let err = Pipeline::default().run(&table).unwrap_err();
    assert_eq!(
        err,
        PipelineError::MissingColumns {
            missing: vec![CanonicalField::Subject, CanonicalField::ObservedAt],
            present: vec!["Equipo".to_string(), "Peso".to_string()],
        }
    );
    Ok(())
}

#[test]
fn json_export_with_default_config() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("export.json");
    fs::write(
        &path,
        r#"[
            {"jugador": "Ana", "categoria": "U17", "fecha": "2024-06-05", "JURDAN (D)": 75, "JURDAN (I)": null},
            {"jugador": "Luis", "categoria": null, "fecha": "05/06/2024", "JURDAN (D)": "74,9"}
        ]"#,
    )?;

    let table = load_file(&path, None)?;
    let ds = Pipeline::default().run(&table)?;

    assert_eq!(ds.len(), 2);
    let ana = &ds.records[0];
    assert_eq!(
        ana.metric("JURDAN (D)"),
        Some((MetricValue::Value(75.0), Classification::Pass))
    );
    assert_eq!(
        ana.metric("JURDAN (I)"),
        Some((MetricValue::Unresolved, Classification::Unknown))
    );
    assert_eq!(ana.metric("THOMAS PSOAS (D)"), None);
    assert_eq!(ds.records[1].record.category, "uncategorized");
    assert_eq!(ds.dates.len(), 1);
    Ok(())
}

#[test]
fn parquet_export_is_read_as_text() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("export.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("Nombre", DataType::Utf8, true),
        Field::new("Fecha", DataType::Utf8, true),
        Field::new("JURDAN D", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("Ana"), None, Some("Luis")])),
        Arc::new(StringArray::from(vec!["05/06/2024", "05/06/2024", "12/06/2024"])),
        Arc::new(Float64Array::from(vec![Some(80.5), Some(90.0), None])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let mut writer = ArrowWriter::try_new(fs::File::create(&path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    let table = load_file(&path, None)?;
    assert_eq!(table.headers, ["Nombre", "Fecha", "JURDAN D"]);
    let ds = Pipeline::new(jurdan_config()).run(&table)?;

    assert_eq!(ds.len(), 2);
    assert_eq!(ds.report.dropped[0].reason, RowError::EmptySubject);
    assert_eq!(ds.records[0].results[0].classification, Classification::Pass);
    assert_eq!(ds.records[1].results[0].classification, Classification::Unknown);
    Ok(())
}

#[test]
fn filtering_a_loaded_dataset() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("export.csv");
    fs::write(
        &path,
        "Jugador;Categoría;Fecha;JURDAN D\n\
         Ana;U17;05/06/2024;76\n\
         Luis;U19;05/06/2024;70\n\
         Ana;U17;12/06/2024;78\n\
         Marta;;12/06/2024;75\n",
    )?;
    let ds = Pipeline::new(jurdan_config()).run(&load_file(&path, None)?)?;

    let everything = apply(&ds, &FilterCriteria::default());
    assert_eq!(everything.len(), 4);

    let june12 = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
    let criteria = FilterCriteria {
        categories: ["U17", "uncategorized"].iter().map(|s| s.to_string()).collect(),
        dates: [june12].into_iter().collect(),
        ..Default::default()
    };
    let subjects: Vec<&str> = apply(&ds, &criteria)
        .iter()
        .map(|r| r.record.subject.as_str())
        .collect();
    assert_eq!(subjects, ["Ana", "Marta"]);

    let mut state = ViewState::default();
    state.set_dataset(Arc::new(ds));
    state.toggle(Dimension::Subject, Selection::Text("Luis".into()));
    assert_eq!(state.summary(), (1, 4));
    assert_eq!(
        state.visible_records()[0].results[0].classification,
        Classification::Fail
    );
    Ok(())
}

#[test]
fn optional_category_can_be_made_required() -> Result<()> {
    let mut config = jurdan_config();
    config.aliases = vec![
        FieldAliases {
            field: CanonicalField::Subject,
            aliases: vec!["Jugador".into()],
            required: true,
        },
        FieldAliases {
            field: CanonicalField::Category,
            aliases: vec!["Categoría".into()],
            required: true,
        },
        FieldAliases {
            field: CanonicalField::ObservedAt,
            aliases: vec!["Fecha".into()],
            required: true,
        },
    ];
    let headers = vec!["Jugador".to_string(), "Fecha".to_string()];

    let err = Pipeline::new(config).resolve(&headers).unwrap_err();
    let PipelineError::MissingColumns { missing, .. } = err;
    assert_eq!(missing, [CanonicalField::Category]);
    Ok(())
}
