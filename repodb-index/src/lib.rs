#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod compression;
pub use compression::Compression;

mod error;
pub use error::Error;

mod record;
pub use record::Index;
pub use record::IndexRecord;

mod repository;
pub use repository::PUBLIC_INDEX_FILE;
pub use repository::Repository;
pub use repository::RepositoryLock;
pub use repository::STAGE_INDEX_FILE;
