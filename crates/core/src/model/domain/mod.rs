pub mod embedding_extractor;
pub mod incremental_classifier;
