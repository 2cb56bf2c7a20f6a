// Projection writers.
//
// CSV keeps the table's column order and writes undefined values as empty
// cells. JSON is an array of objects (one per player, keys in column order)
// with `null` for undefined values.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use tracing::info;

use marcel_core::{PlayerKind, StatTable, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// `<dir>/hitters_<season>.<ext>` or `<dir>/pitchers_<season>.<ext>`.
pub fn output_path(dir: &Path, kind: PlayerKind, season: i32, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}_{}.{}", kind.label(), season, format.extension()))
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

struct Record<'a> {
    columns: &'a [String],
    row: &'a [Value],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

struct Records<'a>(&'a StatTable);

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.len()))?;
        for row in table.rows() {
            seq.serialize_element(&Record {
                columns: table.columns(),
                row,
            })?;
        }
        seq.end()
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

pub fn write_table<W: Write>(table: &StatTable, format: OutputFormat, mut writer: W) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => table.write_csv(writer).context("failed to write CSV")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &Records(table)).context("failed to write JSON")?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Write one projection table into `dir`, creating it if needed. Returns the
/// file written.
pub fn write_projection(
    dir: &Path,
    kind: PlayerKind,
    season: i32,
    format: OutputFormat,
    table: &StatTable,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let path = output_path(dir, kind, season, format);
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    write_table(table, format, BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!("wrote {} {} to {}", table.len(), kind.label(), path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
