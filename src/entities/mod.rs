pub mod sync_meta;
pub mod todo;

pub use sync_meta::Entity as SyncMeta;
pub use todo::Entity as Todo;
