//! Backend adapters: the hosted BaaS over HTTP and the in-memory fallback

pub mod factory;
pub mod mock;
pub mod remote;

pub use factory::BackendFactory;
pub use mock::{MockBackend, MockStore, MockUser};
pub use remote::RemoteBackend;
