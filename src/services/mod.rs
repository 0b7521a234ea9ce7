pub mod local_store;
pub mod memory_store;
pub mod pack_service;
pub mod store;
