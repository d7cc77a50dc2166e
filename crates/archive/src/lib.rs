//! Compressed cache archive construction
//!
//! Packages the resolved cache paths into a single `.tar.zst` file. The
//! pipeline streams: members are appended to a tar writer that compresses
//! through a multithreaded zstd encoder with long-distance matching, so
//! memory use stays flat for arbitrarily large build trees.
//!
//! Member names preserve their absolute paths, matching how the archives
//! are laid back down on restore. An empty member list is reported as
//! [`ArchiveOutcome::Empty`] rather than an error; the save step treats
//! "nothing to archive" as success.

mod builder;
mod error;

pub use builder::{Archive, ArchiveOutcome, Archiver, TarZstdArchiver};
pub use error::{Error, Result};
