//! Repository layer for database operations.
//!
//! Repository structs encapsulate queries and commands following the Data
//! Mapper pattern recommended by SeaORM: entities stay pure data models
//! while repositories provide the reusable access methods.

pub mod sync_meta;
pub mod todo;

pub use sync_meta::SyncMetaRepository;
pub use todo::TodoRepository;
