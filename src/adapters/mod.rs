// Adapters layer: concrete implementations of the domain ports for the local file system and the map API.

pub mod http;
pub mod registry;
pub mod storage;
