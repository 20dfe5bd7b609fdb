mod client;
mod memory;
mod store;

pub use client::KubeStore;
pub use memory::MemoryStore;
pub use store::*;

pub use kube::api::DynamicObject;
pub use kube::discovery::ApiResource;
