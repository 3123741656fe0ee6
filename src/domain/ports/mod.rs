pub mod lease_store;
pub mod task_spawner;
pub mod time_service;
