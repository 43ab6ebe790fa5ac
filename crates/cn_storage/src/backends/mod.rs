pub mod memory;
pub mod rest;

pub use memory::MemoryBackend;
pub use rest::RestBackend;
