pub mod notify;
pub mod qdrant;
pub mod store;

pub use notify::{HttpEmailNotifier, TwilioSmsNotifier};
pub use qdrant::QdrantAdapter;
pub use store::MemoryStore;
