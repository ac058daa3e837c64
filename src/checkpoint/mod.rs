mod metadata;
mod store;

pub use metadata::{TableFile, TableMetadata, TABLE_FORMAT_VERSION};
pub use store::{AgentId, LoadedTable, TableStore, TableStoreConfig};
