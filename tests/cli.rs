use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use anyhow::Result;
use tempfile::tempdir;

use mobility_panel::data::loader::load_file;
use mobility_panel::error::RowError;
use mobility_panel::pipeline::Pipeline;

fn panel(args: &[&str]) -> Result<Output> {
    Ok(Command::new(env!("CARGO_BIN_EXE_mobility-panel"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()?)
}

fn write_export(dir: &Path) -> Result<String> {
    let path = dir.join("export.csv");
    fs::write(
        &path,
        "Jugador;Categoría;Fecha;JURDAN (D)\n\
         Ana;U17;05/06/2024;76\n\
         Luis;U19;12/06/2024;70,0\n",
    )?;
    Ok(path.display().to_string())
}

#[test]
fn missing_columns_exit_with_status_two() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad.csv");
    fs::write(&path, "Equipo,Peso\nU17,60\n")?;

    let out = panel(&[path.to_str().unwrap()])?;
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr.contains("missing: subject"), "{stderr}");
    assert!(stderr.contains("missing: observed_at"), "{stderr}");
    assert!(stderr.contains("Columns present: Equipo, Peso"), "{stderr}");
    assert!(out.stdout.is_empty());
    Ok(())
}

#[test]
fn table_with_date_filter() -> Result<()> {
    let dir = tempdir()?;
    let path = write_export(dir.path())?;

    let out = panel(&[&path, "--date", "12/06/2024"])?;
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert!(stdout.contains("Luis"), "{stdout}");
    assert!(stdout.contains("70 👎"), "{stdout}");
    assert!(!stdout.contains("Ana"), "{stdout}");
    assert!(stdout.contains("Records: 1/2"), "{stdout}");
    Ok(())
}

#[test]
fn bad_date_filter_is_an_error() -> Result<()> {
    let dir = tempdir()?;
    let path = write_export(dir.path())?;

    let out = panel(&[&path, "--date", "12/06/24"])?;
    let stderr = String::from_utf8_lossy(&out.stderr);

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr.contains("--date 12/06/24"), "{stderr}");
    assert!(out.stdout.is_empty());
    Ok(())
}

#[test]
fn json_output_respects_subject_filter() -> Result<()> {
    let dir = tempdir()?;
    let path = write_export(dir.path())?;

    let out = panel(&[&path, "--subject", "Ana", "--format", "json"])?;
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["subject"], "Ana");
    assert_eq!(rows[0]["results"][0]["metric_name"], "JURDAN (D)");
    assert_eq!(rows[0]["results"][0]["classification"], "pass");
    Ok(())
}

#[test]
fn list_columns_prints_resolution() -> Result<()> {
    let dir = tempdir()?;
    let path = write_export(dir.path())?;

    let out = panel(&[&path, "--list-columns"])?;
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success());
    assert!(
        stdout.contains("Detected columns: Jugador, Categoría, Fecha, JURDAN (D)"),
        "{stdout}"
    );
    assert!(stdout.contains("subject      <- Jugador"), "{stdout}");
    assert!(stdout.contains("category     <- Categoría"), "{stdout}");
    assert!(stdout.contains("observed_at  <- Fecha"), "{stdout}");
    assert!(stdout.contains("JURDAN (D)   <- JURDAN (D)"), "{stdout}");
    assert!(stdout.contains("JURDAN (I)   <- (absent)"), "{stdout}");
    Ok(())
}

#[test]
fn generated_sample_drops_two_rows() -> Result<()> {
    let dir = tempdir()?;
    let out = Command::new(env!("CARGO_BIN_EXE_generate-sample"))
        .arg(dir.path())
        .output()?;
    assert!(out.status.success());

    for name in ["mobility_sample.csv", "mobility_sample.parquet"] {
        let table = load_file(&dir.path().join(name), None)?;
        let ds = Pipeline::default().run(&table)?;

        assert_eq!(ds.report.total_rows, 26, "{name}");
        assert_eq!(ds.report.dropped.len(), 2, "{name}");
        assert_eq!(ds.report.dropped[0].reason, RowError::EmptySubject, "{name}");
        assert_eq!(
            ds.report.dropped[1].reason,
            RowError::UnparseableDate("pendiente".to_string()),
            "{name}"
        );
        assert_eq!(ds.len(), 24, "{name}");
        assert_eq!(ds.metric_names.len(), 8);
        assert!(ds.records.iter().all(|r| r.results.len() == 8), "{name}");
    }
    Ok(())
}
