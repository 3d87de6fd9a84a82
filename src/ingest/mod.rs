pub mod coordinator;

pub use coordinator::IngestionCoordinator;
