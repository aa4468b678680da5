pub mod ingest;
pub mod rating;
pub mod reconcile;
pub mod resolver;
