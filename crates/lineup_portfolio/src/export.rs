//! Headerless CSV export of lineups by display name.

use crate::error::PortfolioError;
use lineup_core::{Candidate, EntityId, Lineup};
use std::collections::HashMap;
use std::io;
use tracing::warn;

/// Write one row per lineup, one display name per column, no header.
///
/// Lineups whose size differs from `required_size` are skipped with a
/// warning. Returns the number of rows written.
///
/// # Errors
///
/// - `PortfolioError::Export` if `lineups` is empty, or an entity is not in
///   `candidates` or has no display name
/// - `PortfolioError::Csv` / `PortfolioError::Io` on writer failure
pub fn write_lineups<W: io::Write>(
    writer: W,
    lineups: &[Lineup],
    candidates: &[Candidate],
    required_size: usize,
) -> Result<usize, PortfolioError> {
    if lineups.is_empty() {
        return Err(PortfolioError::export("no lineups to export"));
    }
    let names: HashMap<&EntityId, Option<&str>> = candidates
        .iter()
        .map(|c| (&c.id, c.display_name()))
        .collect();

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    let mut rows = 0;
    for (index, lineup) in lineups.iter().enumerate() {
        if lineup.len() != required_size {
            warn!(
                index,
                size = lineup.len(),
                required_size,
                "skipping lineup with wrong cardinality"
            );
            continue;
        }
        let record = lineup
            .entity_ids()
            .iter()
            .map(|id| match names.get(id) {
                Some(Some(name)) => Ok(*name),
                Some(None) => Err(PortfolioError::export(format!(
                    "entity {} has no display name",
                    id
                ))),
                None => Err(PortfolioError::export(format!("unknown entity {}", id))),
            })
            .collect::<Result<Vec<&str>, _>>()?;
        csv_writer.write_record(&record)?;
        rows += 1;
    }
    csv_writer.flush()?;
    Ok(rows)
}

/// Render lineups with [`write_lineups`] into a string.
pub fn export_lineups(
    lineups: &[Lineup],
    candidates: &[Candidate],
    required_size: usize,
) -> Result<String, PortfolioError> {
    let mut buffer = Vec::new();
    write_lineups(&mut buffer, lineups, candidates, required_size)?;
    String::from_utf8(buffer).map_err(|e| PortfolioError::export(e.to_string()))
}
