pub mod archive;
pub mod pool;

pub use archive::MaintenanceArchive;
pub use pool::create_pool;
