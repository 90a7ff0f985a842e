pub mod outbound;

pub use outbound::BlockSetStore;
