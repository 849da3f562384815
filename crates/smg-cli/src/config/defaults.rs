use std::path::PathBuf;

pub struct DefaultsConfig {
    pub data_dir: PathBuf,
    pub iterations: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            iterations: 100,
        }
    }
}
