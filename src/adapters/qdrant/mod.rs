mod client;

pub use client::QdrantAdapter;
