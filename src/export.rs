//! Export of resolved entries for the document renderer
//!
//! Writes the ordered (word, gloss) list as JSON or TSV. In blank mode each
//! gloss line is cut down to its part-of-speech tag, which gives a
//! fill-in-the-meaning dictation sheet.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{GlossError, Result};
use crate::pipeline::{EnrichmentReport, GlossSource, ResolvedEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Tsv,
}

impl FromStr for ExportFormat {
    type Err = GlossError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "tsv" => Ok(Self::Tsv),
            other => Err(GlossError::Config(format!("unknown export format: {}", other))),
        }
    }
}

fn pos_regex() -> &'static Regex {
    static POS_RE: OnceLock<Regex> = OnceLock::new();
    POS_RE.get_or_init(|| Regex::new(r"^([A-Za-z]+\.)").expect("pos pattern is valid"))
}

/// Keep only the part-of-speech tag of each gloss line
pub fn blank_gloss(gloss: &str) -> String {
    gloss
        .lines()
        .filter_map(|line| pos_regex().captures(line.trim()))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn blank_entry(entry: &ResolvedEntry) -> ResolvedEntry {
    let gloss = match entry.source {
        GlossSource::Unresolved => String::new(),
        _ => blank_gloss(&entry.gloss),
    };
    ResolvedEntry {
        gloss,
        ..entry.clone()
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    generated_at: &'a chrono::DateTime<chrono::Utc>,
    stats: &'a crate::pipeline::EnrichmentStats,
    entries: &'a [ResolvedEntry],
}

/// Write a report in the chosen format
pub fn write_export<W: Write>(
    report: &EnrichmentReport,
    format: ExportFormat,
    blank: bool,
    mut writer: W,
) -> Result<()> {
    let blanked: Vec<ResolvedEntry>;
    let entries: &[ResolvedEntry] = if blank {
        blanked = report.entries.iter().map(blank_entry).collect();
        &blanked
    } else {
        &report.entries
    };

    match format {
        ExportFormat::Json => {
            let export = JsonExport {
                generated_at: &report.generated_at,
                stats: &report.stats,
                entries,
            };
            serde_json::to_writer_pretty(&mut writer, &export)
                .map_err(|e| GlossError::Export(e.to_string()))?;
            writeln!(writer).map_err(|e| GlossError::Export(e.to_string()))?;
        }
        ExportFormat::Tsv => {
            for entry in entries {
                writeln!(
                    writer,
                    "{}\t{}\t{}",
                    tsv_field(&entry.word),
                    tsv_field(&entry.gloss),
                    entry.source
                )
                .map_err(|e| GlossError::Export(e.to_string()))?;
            }
        }
    }
    writer.flush().map_err(|e| GlossError::Export(e.to_string()))
}

/// Write a report to a file, creating or truncating it
pub fn export_to_path(
    report: &EnrichmentReport,
    format: ExportFormat,
    blank: bool,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| GlossError::Export(format!("cannot create {}: {}", path.display(), e)))?;
    write_export(report, format, blank, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), blank, "Wrote export");
    Ok(())
}

fn tsv_field(text: &str) -> String {
    text.replace('\t', " ").replace('\n', " / ")
}
