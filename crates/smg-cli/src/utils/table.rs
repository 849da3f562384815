use crate::error::{CliError, Result};
use statmech_glass::core::species::{SpeciesGroup, SpeciesState};
use std::fmt::Write as _;
use std::io;
use std::path::Path;

/// Formats the distribution group by group: global population, then the
/// share within the group.
pub fn render_state(state: &SpeciesState) -> String {
    let mut out = String::new();
    for group in state.groups() {
        let _ = writeln!(out, "{} ({:.2} of 100)", group.symbol, group.total());
        for ((name, population), share) in group
            .names()
            .iter()
            .zip(group.values())
            .zip(group_shares(state, group))
        {
            let _ = writeln!(out, "  {:<6} {:>9.4} {:>8.2} %", name, population, share);
        }
    }
    out
}

/// Writes one row per species: group, species, global population and
/// percentage within the group.
pub fn write_state_csv<W: io::Write>(state: &SpeciesState, writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["group", "species", "population", "group_percent"])?;
    for group in state.groups() {
        for ((name, population), share) in group
            .names()
            .iter()
            .zip(group.values())
            .zip(group_shares(state, group))
        {
            writer.write_record([
                group.symbol.as_str(),
                name.as_str(),
                population.to_string().as_str(),
                share.to_string().as_str(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Percentages within the group; zeros for an empty group.
fn group_shares(state: &SpeciesState, group: &SpeciesGroup) -> Vec<f64> {
    state
        .group_percentages(&group.symbol)
        .map(|shares| shares.into_iter().map(|(_, share)| share).collect())
        .unwrap_or_else(|| vec![0.0; group.values().len()])
}

pub fn save_state_csv(state: &SpeciesState, path: &Path) -> Result<()> {
    let output_err = |source: csv::Error| CliError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path)?;
    write_state_csv(state, file).map_err(output_err)
}
