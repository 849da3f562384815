use super::formers::aluminate::AluminateEngine;
use super::formers::borate::BorateEngine;
use super::formers::phosphate::PhosphateEngine;
use super::formers::silicate::SilicateEngine;
use super::formers::{BinaryDataset, FormerConfig, FormerEngine, ShapeError};
use super::io::loader::{DataLoadError, DataLoader};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRole {
    Former,
    Intermediate,
    Modifier,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown former or intermediate '{0}'")]
    UnknownFormer(String),
    #[error("Failed to load dataset for '{former}' with '{partner}': {source}")]
    Data {
        former: String,
        partner: String,
        source: DataLoadError,
    },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Maps component symbols to their roles and former engines.
///
/// Membership is fixed at construction; the order of registration is the
/// order in which the structure solver visits formers, intermediates and
/// modifiers.
#[derive(Debug)]
pub struct FormerRegistry {
    engines: Vec<Box<dyn FormerEngine>>,
    modifiers: Vec<&'static str>,
}

impl Default for FormerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FormerRegistry {
    /// Si, B, P as formers, Al as intermediate, Na, K, Li, Ca as modifiers.
    pub fn standard() -> Self {
        Self {
            engines: vec![
                Box::new(SilicateEngine),
                Box::new(BorateEngine),
                Box::new(PhosphateEngine),
                Box::new(AluminateEngine),
            ],
            modifiers: vec!["Na", "K", "Li", "Ca"],
        }
    }

    pub fn lookup(&self, symbol: &str) -> Option<&dyn FormerEngine> {
        self.engines
            .iter()
            .find(|e| e.config().symbol == symbol)
            .map(|e| e.as_ref())
    }

    pub fn config(&self, symbol: &str) -> Option<&'static FormerConfig> {
        self.lookup(symbol).map(|e| e.config())
    }

    pub fn role_of(&self, symbol: &str) -> Option<ComponentRole> {
        if let Some(engine) = self.lookup(symbol) {
            Some(engine.config().role)
        } else if self.is_modifier(symbol) {
            Some(ComponentRole::Modifier)
        } else {
            None
        }
    }

    pub fn is_modifier(&self, symbol: &str) -> bool {
        self.modifiers.contains(&symbol)
    }

    /// Symbols with the given role, in registration order.
    pub fn symbols(&self, role: ComponentRole) -> Vec<&'static str> {
        match role {
            ComponentRole::Modifier => self.modifiers.clone(),
            _ => self
                .engines
                .iter()
                .map(|e| e.config())
                .filter(|c| c.role == role)
                .map(|c| c.symbol)
                .collect(),
        }
    }

    /// Formers, then intermediates: the order in which the structure solver
    /// visits network components. The first one present in a glass leads.
    pub fn network_order(&self) -> Vec<&'static str> {
        let mut order = self.symbols(ComponentRole::Former);
        order.extend(self.symbols(ComponentRole::Intermediate));
        order
    }

    /// Looks up a former and loads its binary dataset against `partner`
    /// (`<data_dir>/<partner>.csv`).
    pub fn lookup_with_data(
        &self,
        symbol: &str,
        partner: &str,
        loader: &DataLoader,
    ) -> Result<(&dyn FormerEngine, BinaryDataset), RegistryError> {
        let engine = self
            .lookup(symbol)
            .ok_or_else(|| RegistryError::UnknownFormer(symbol.to_string()))?;
        let config = engine.config();
        debug!(former = symbol, partner, "Loading binary dataset.");

        let columns = loader
            .load_columns(config.data_dir, partner, config.dataset_columns())
            .map_err(|e| RegistryError::Data {
                former: symbol.to_string(),
                partner: partner.to_string(),
                source: e,
            })?;
        let partner_atoms = self
            .config(partner)
            .map(|c| c.atoms_per_formula)
            .unwrap_or(1.0);
        let dataset = BinaryDataset::from_columns(config, partner, partner_atoms, columns)?;
        Ok((engine, dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn roles_follow_registry_membership() {
        let registry = FormerRegistry::standard();
        assert_eq!(registry.role_of("Si"), Some(ComponentRole::Former));
        assert_eq!(registry.role_of("Al"), Some(ComponentRole::Intermediate));
        assert_eq!(registry.role_of("Ca"), Some(ComponentRole::Modifier));
        assert_eq!(registry.role_of("Xe"), None);
    }

    #[test]
    fn symbols_are_listed_in_registration_order() {
        let registry = FormerRegistry::standard();
        assert_eq!(
            registry.symbols(ComponentRole::Former),
            vec!["Si", "B", "P"]
        );
        assert_eq!(registry.symbols(ComponentRole::Intermediate), vec!["Al"]);
        assert_eq!(
            registry.symbols(ComponentRole::Modifier),
            vec!["Na", "K", "Li", "Ca"]
        );
    }

    #[test]
    fn intermediates_follow_every_former_in_network_order() {
        let registry = FormerRegistry::standard();
        assert_eq!(registry.network_order(), vec!["Si", "B", "P", "Al"]);
    }

    #[test]
    fn lookup_is_idempotent() {
        let registry = FormerRegistry::standard();
        let first = *registry.config("B").unwrap();
        let second = *registry.config("B").unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::eq(
            registry.config("B").unwrap(),
            registry.config("B").unwrap()
        ));
    }

    #[test]
    fn unknown_symbol_has_no_config() {
        let registry = FormerRegistry::standard();
        assert!(registry.lookup("Na").is_none());
        assert!(registry.config("AlB").is_none());
    }

    #[test]
    fn lookup_with_data_preloads_the_binary_dataset() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Data/P2O5")).unwrap();
        fs::write(
            dir.path().join("Data/P2O5/Na.csv"),
            "10,80,20,0,0\n30,40,55,5,0\n",
        )
        .unwrap();
        let loader = DataLoader::new(dir.path());
        let registry = FormerRegistry::standard();

        let (engine, data) = registry.lookup_with_data("P", "Na", &loader).unwrap();
        assert_eq!(engine.config().symbol, "P");
        assert_eq!(data.content, vec![10.0, 30.0]);
        assert_eq!(data.observed[2], vec![0.0, 5.0]);
        assert_eq!(data.partner_atoms_per_formula, 1.0);
    }

    #[test]
    fn lookup_with_data_rejects_unknown_former() {
        let dir = tempdir().unwrap();
        let loader = DataLoader::new(dir.path());
        let registry = FormerRegistry::standard();
        let result = registry.lookup_with_data("Ge", "Na", &loader);
        assert!(matches!(result, Err(RegistryError::UnknownFormer(_))));
    }

    #[test]
    fn lookup_with_data_reports_missing_file() {
        let dir = tempdir().unwrap();
        let loader = DataLoader::new(dir.path());
        let registry = FormerRegistry::standard();
        let result = registry.lookup_with_data("Si", "K", &loader);
        assert!(matches!(result, Err(RegistryError::Data { .. })));
    }
}
