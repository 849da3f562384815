use serde::Serialize;

/// Tolerance used when checking that a group's population is conserved.
pub const CONSERVATION_TOLERANCE: f64 = 1e-6;

/// The species populations of one former or intermediate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesGroup {
    pub symbol: String,
    names: Vec<String>,
    values: Vec<f64>,
}

impl SpeciesGroup {
    pub fn new(symbol: &str, species: &[(&str, f64)]) -> Self {
        Self {
            symbol: symbol.to_string(),
            names: species.iter().map(|(n, _)| n.to_string()).collect(),
            values: species.iter().map(|(_, v)| *v).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    /// Replaces the populations after a draw. The number of species is fixed.
    pub(crate) fn replace(&mut self, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.values.len());
        debug_assert!(
            (values.iter().sum::<f64>() - self.total()).abs() < CONSERVATION_TOLERANCE,
            "species population of '{}' drifted from {} to {}",
            self.symbol,
            self.total(),
            values.iter().sum::<f64>()
        );
        self.values = values;
    }

    /// Scales every population by `factor`, used when a group starts at its
    /// share of the total former content.
    pub(crate) fn scaled(mut self, factor: f64) -> Self {
        for v in &mut self.values {
            *v *= factor;
        }
        self
    }
}

/// The species distribution of a glass.
///
/// Populations are on the global 0–100 scale: the sum over all groups is 100
/// and every group holds its component's share of the total former atom
/// fraction. [`SpeciesState::group_percentages`] gives the distribution within
/// a single former.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeciesState {
    groups: Vec<SpeciesGroup>,
}

impl SpeciesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_group(&mut self, group: SpeciesGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[SpeciesGroup] {
        &self.groups
    }

    pub fn group(&self, symbol: &str) -> Option<&SpeciesGroup> {
        self.groups.iter().find(|g| g.symbol == symbol)
    }

    pub(crate) fn group_mut(&mut self, symbol: &str) -> Option<&mut SpeciesGroup> {
        self.groups.iter_mut().find(|g| g.symbol == symbol)
    }

    /// Population of a species by name, searching every group.
    pub fn get(&self, species: &str) -> Option<f64> {
        self.groups.iter().find_map(|g| g.get(species))
    }

    /// Iterates `(species, population)` in group order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.groups.iter().flat_map(|g| {
            g.names
                .iter()
                .zip(g.values.iter())
                .map(|(n, v)| (n.as_str(), *v))
        })
    }

    pub fn total(&self) -> f64 {
        self.groups.iter().map(SpeciesGroup::total).sum()
    }

    /// Distribution within one group, renormalised to sum to 100.
    pub fn group_percentages(&self, symbol: &str) -> Option<Vec<(String, f64)>> {
        let group = self.group(symbol)?;
        let total = group.total();
        if total <= 0.0 {
            return None;
        }
        Some(
            group
                .names
                .iter()
                .zip(group.values.iter())
                .map(|(n, v)| (n.clone(), v / total * 100.0))
                .collect(),
        )
    }
}

impl FromIterator<SpeciesGroup> for SpeciesState {
    fn from_iter<I: IntoIterator<Item = SpeciesGroup>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
