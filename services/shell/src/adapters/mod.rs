pub mod clock;
pub mod file_store;
pub mod memory_store;

pub use clock::SystemClock;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
