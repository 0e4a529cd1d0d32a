mod entity;
mod parse;
mod provider;

pub use entity::{Entity, Snapshot, UNCATEGORIZED};
pub use provider::{BuiltinProvider, EntityProvider, JsonFileProvider};
