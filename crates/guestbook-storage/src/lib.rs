//! # guestbook-storage
//!
//! Blob storage for uploaded media. Implements the `BlobStore` port from
//! guestbook-core on top of a local directory.

mod local;

pub use local::LocalBlobStore;
