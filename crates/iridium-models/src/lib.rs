//! Model plumbing for Iridium.
//!
//! This crate provides everything between a serialized artifact and a
//! query-ready handle:
//!
//! - **Blob store**: durable key -> artifact storage (`FsBlobStore`,
//!   `MemBlobStore`)
//! - **Codec**: encoding/decoding artifacts with structural validation
//! - **Cache**: in-memory loaded handles keyed by version
//! - **Registry**: the composed authority for version lifecycle
//!
//! The only concrete architecture shipped here is the linear placeholder
//! model the registry bootstraps with.

pub mod cache;
pub mod codec;
pub mod error;
pub mod linear;
pub mod registry;
pub mod store;

pub use cache::{CacheStats, CachedHandle, ModelCache};
pub use codec::{CodecError, decode_model, encode_model, sha256_hex};
pub use error::{RegistryError, RegistryResult};
pub use linear::LinearModel;
pub use registry::{ModelRegistry, ModelVersionInfo, VersionStatus};
pub use store::{BlobMeta, BlobStore, FsBlobStore, MemBlobStore, validate_version};
