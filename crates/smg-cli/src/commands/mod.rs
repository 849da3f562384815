pub mod fit;
pub mod series;
pub mod structure;
