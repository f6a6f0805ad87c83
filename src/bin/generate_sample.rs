use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const HEADERS: [&str; 11] = [
    "Jugador",
    "Categoría",
    "Fecha",
    "THOMAS PSOAS (D)",
    "THOMAS PSOAS (I)",
    "THOMAS CUADRICEPS (D)",
    "THOMAS CUADRICEPS (I)",
    "THOMAS SARTORIO (D)",
    "THOMAS SARTORIO (I)",
    "JURDAN (D)",
    "JURDAN (I)",
];

/// Mean and spread per metric, roughly centred on the pass threshold.
const METRIC_PROFILE: [(f64, f64); 8] = [
    (11.0, 3.0),
    (11.0, 3.0),
    (52.0, 6.0),
    (52.0, 6.0),
    (81.0, 5.0),
    (81.0, 5.0),
    (76.0, 6.0),
    (76.0, 6.0),
];

/// Format with a decimal comma, as the source spreadsheets do.
fn decimal_comma(v: f64) -> String {
    format!("{v:.1}").replace('.', ",")
}

fn build_rows(rng: &mut SimpleRng) -> Vec<Vec<String>> {
    let squads = [
        ("U17", ["Ana", "Lucía", "Marta", "Sofía"]),
        ("U19", ["Luis", "Pedro", "Javier", "Andrés"]),
    ];
    let sessions = ["05/06/2024", "12/06/2024", "19/06/2024"];

    let mut rows = Vec::new();
    for session in sessions {
        for (category, players) in &squads {
            for player in players {
                let mut row = vec![player.to_string(), category.to_string(), session.to_string()];
                for &(mean, spread) in &METRIC_PROFILE {
                    let cell = match rng.next_f64() {
                        p if p < 0.04 => String::new(),
                        p if p < 0.06 => "n/a".to_string(),
                        _ => decimal_comma(rng.gauss(mean, spread).max(0.0)),
                    };
                    row.push(cell);
                }
                rows.push(row);
            }
        }
    }

    // Rows the pipeline is expected to drop.
    let mut no_name = rows[0].clone();
    no_name[0] = String::new();
    rows.push(no_name);

    let mut bad_date = rows[1].clone();
    bad_date[2] = "pendiente".to_string();
    rows.push(bad_date);

    rows
}

fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|h| Field::new(*h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = (0..HEADERS.len())
        .map(|col| {
            let cells: Vec<Option<&str>> = rows
                .iter()
                .map(|r| Some(r[col].as_str()).filter(|c| !c.is_empty()))
                .collect();
            Arc::new(StringArray::from(cells)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| ".".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = build_rows(&mut rng);

    let csv_path = out_dir.join("mobility_sample.csv");
    write_csv(&csv_path, &rows)?;

    let parquet_path = out_dir.join("mobility_sample.parquet");
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} rows to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
