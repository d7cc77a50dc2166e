//! tar + zstd archive construction

use crate::{Error, Result};
use chrono::Utc;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A finished cache archive on disk.
///
/// The path is only valid while the caller keeps the owning temporary
/// directory alive; this crate does not manage that lifetime.
#[derive(Debug, Clone)]
pub struct Archive {
    /// Location of the archive file.
    pub path: PathBuf,
    /// Size of the archive in bytes.
    pub size_bytes: u64,
}

/// The outcome of an archive build.
///
/// An empty member list is a deliberate short-circuit, not an error: the
/// save step as a whole terminates successfully without an archive or an
/// upload when nothing resolved.
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// An archive was written.
    Created(Archive),
    /// There was nothing to archive.
    Empty,
}

/// Capability for packaging a member list into a single archive file.
///
/// The concrete packaging mechanism stays behind this seam so it can be
/// swapped (library codec, external process) without touching path
/// resolution or the upload client.
pub trait Archiver {
    /// Package `members` into one archive inside `dest_dir`.
    fn build(&self, members: &[PathBuf], dest_dir: &Path) -> Result<ArchiveOutcome>;
}

/// [`Archiver`] producing a `.tar.zst` with an in-process streaming
/// pipeline: a tar writer compressing through a multithreaded zstd encoder
/// with long-distance matching, tuned for large and highly redundant
/// build-output trees.
///
/// Member names keep their absolute paths (the equivalent of GNU tar's
/// `--absolute-names`); restore relies on that.
#[derive(Debug, Clone)]
pub struct TarZstdArchiver {
    level: i32,
}

impl Default for TarZstdArchiver {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl TarZstdArchiver {
    /// Create an archiver with an explicit zstd compression level.
    #[must_use]
    pub fn with_level(level: i32) -> Self {
        Self { level }
    }
}

impl Archiver for TarZstdArchiver {
    fn build(&self, members: &[PathBuf], dest_dir: &Path) -> Result<ArchiveOutcome> {
        if members.is_empty() {
            tracing::info!("no paths to archive");
            return Ok(ArchiveOutcome::Empty);
        }

        let archive_path = dest_dir.join(archive_file_name());
        tracing::debug!(path = %archive_path.display(), members = members.len(), "creating cache archive");

        match write_archive(&archive_path, members, self.level) {
            Ok(size_bytes) => Ok(ArchiveOutcome::Created(Archive {
                path: archive_path,
                size_bytes,
            })),
            Err(err) => {
                // The half-written file is not a valid archive; drop it so
                // nothing downstream can pick it up.
                let _ = fs::remove_file(&archive_path);
                Err(err)
            }
        }
    }
}

/// Deterministic archive name from the current UTC timestamp.
fn archive_file_name() -> String {
    format!("cache-{}.tar.zst", Utc::now().format("%Y%m%d-%H%M%S"))
}

fn write_archive(archive_path: &Path, members: &[PathBuf], level: i32) -> Result<u64> {
    let file =
        fs::File::create(archive_path).map_err(|e| Error::io(e, archive_path, "create"))?;

    let mut encoder = zstd::Encoder::new(file, level)
        .map_err(|e| Error::creation(format!("zstd encoder init failed: {e}")))?;
    let workers = std::thread::available_parallelism().map_or(1, |n| n.get());
    encoder
        .multithread(u32::try_from(workers).unwrap_or(1))
        .map_err(|e| Error::creation(format!("zstd multithreading unavailable: {e}")))?;
    encoder
        .long_distance_matching(true)
        .map_err(|e| Error::creation(format!("zstd long-distance matching unavailable: {e}")))?;

    let mut builder = tar::Builder::new(encoder);
    for member in members {
        append_member(&mut builder, member)?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| Error::creation(format!("tar finalize failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::creation(format!("zstd finish failed: {e}")))?;

    let meta = fs::metadata(archive_path).map_err(|e| Error::io(e, archive_path, "stat"))?;
    Ok(meta.len())
}

/// Append one resolved member, recursing into directories so that every
/// directory entry precedes its descendants.
fn append_member<W: Write>(builder: &mut tar::Builder<W>, member: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(member) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            // Resolved earlier but gone now; files can legitimately
            // disappear between resolution and archiving.
            tracing::warn!(path = %member.display(), "path disappeared before archiving");
            return Ok(());
        }
        Err(e) => return Err(Error::io(e, member, "stat")),
    };

    if meta.is_dir() {
        for entry in WalkDir::new(member) {
            let entry = entry
                .map_err(|e| Error::creation(format!("walking {}: {e}", member.display())))?;
            let entry_meta = entry
                .metadata()
                .map_err(|e| Error::creation(format!("walking {}: {e}", member.display())))?;
            append_entry(builder, entry.path(), &entry_meta)?;
        }
    } else {
        append_entry(builder, member, &meta)?;
    }

    Ok(())
}

/// Append a single filesystem entry under its absolute name.
///
/// The tar builder's own path setters only accept relative member names,
/// while cache archives must store absolute ones, so the header name field
/// is filled by hand, with a GNU long-name record when the path exceeds
/// the 100-byte header field.
fn append_entry<W: Write>(builder: &mut tar::Builder<W>, path: &Path, meta: &fs::Metadata) -> Result<()> {
    let mut name = path.as_os_str().as_encoded_bytes().to_vec();
    if meta.is_dir() && !name.ends_with(b"/") {
        name.push(b'/');
    }

    let mut header = tar::Header::new_gnu();
    header.set_metadata(meta);

    if name.len() > 100 {
        append_gnu_long_name(builder, &name)
            .map_err(|e| Error::creation(format!("appending {}: {e}", path.display())))?;
    }
    let stored = name.len().min(100);
    header.as_old_mut().name[..stored].copy_from_slice(&name[..stored]);

    if meta.file_type().is_symlink() {
        let target = fs::read_link(path).map_err(|e| Error::io(e, path, "readlink"))?;
        header
            .set_link_name(&target)
            .map_err(|e| Error::creation(format!("appending {}: {e}", path.display())))?;
    }

    header.set_cksum();

    let append = if meta.is_file() {
        let mut file = fs::File::open(path).map_err(|e| Error::io(e, path, "open"))?;
        builder.append(&header, &mut file)
    } else {
        builder.append(&header, io::empty())
    };
    append.map_err(|e| Error::creation(format!("appending {}: {e}", path.display())))
}

/// Write a GNU `@LongLink` record carrying a full member name.
fn append_gnu_long_name<W: Write>(builder: &mut tar::Builder<W>, name: &[u8]) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    let placeholder = b"././@LongLink";
    header.as_old_mut().name[..placeholder.len()].copy_from_slice(placeholder);
    header.set_entry_type(tar::EntryType::GNULongName);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header.set_size(name.len() as u64);
    header.set_cksum();
    builder.append(&header, name)
}
