// Adapters layer: concrete implementations of the domain ports (providers, dataset, storage).

pub mod dataset;
pub mod llm;
pub mod speech;
pub mod storage;
