pub mod memory;

pub use memory::InMemoryBlockStore;
