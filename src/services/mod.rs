pub mod analytics;
pub mod normalizer;
pub mod weekly;
