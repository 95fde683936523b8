use super::HashingWriter;
use crate::layer_build::domain::{EntryKind, FsEntry, TarballOutput};
use crate::ports::outbound::FilesystemTree;
use crate::shared::error::BuildError;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use flate2::{Compression, GzBuilder};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tar::{Builder, EntryType, Header};

/// Bound on compressed bytes held in memory before reaching the file
const WRITE_BUFFER_SIZE: usize = 4 << 20;

/// TarballEncoder adapter producing the gzip-compressed layer blob
///
/// The tree is traversed once. Tar bytes flow through the diffID hasher into
/// the gzip encoder, whose output flows through the digest hasher into a
/// bounded buffer in front of the file:
///
/// `tar → sha256(diffID) → gzip → sha256(digest) → BufWriter → File`
///
/// Headers carry the source date epoch as mtime, explicit ownership or 0:0,
/// and no user or group names, so equal trees encode to equal bytes.
pub struct TarballEncoder;

impl TarballEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes `tree` into a compressed layer at `path`
    ///
    /// # Errors
    /// Returns [`BuildError::ArchiveError`] if the file cannot be created or
    /// written, an entry cannot be serialized, or the compressor fails to
    /// finish
    pub fn encode(
        &self,
        tree: &dyn FilesystemTree,
        source_date_epoch: DateTime<Utc>,
        path: &Path,
    ) -> Result<TarballOutput> {
        let archive_error = |details: String| BuildError::ArchiveError {
            path: path.to_path_buf(),
            details,
        };

        let file = File::create(path).map_err(|e| archive_error(e.to_string()))?;
        let digest_writer = HashingWriter::new(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file));
        let gzip = GzBuilder::new()
            .mtime(0)
            .write(digest_writer, Compression::default());
        let mut builder = Builder::new(HashingWriter::new(gzip));

        let mtime = u64::try_from(source_date_epoch.timestamp()).unwrap_or(0);
        for (entry_path, entry) in tree.walk() {
            append_entry(&mut builder, &entry_path, entry, mtime).map_err(|e| {
                archive_error(format!("Failed to add {}: {}", entry_path.display(), e))
            })?;
        }

        let diff_id_writer = builder
            .into_inner()
            .map_err(|e| archive_error(format!("Failed to finish tar stream: {}", e)))?;
        let (gzip, diff_id) = diff_id_writer.finalize();
        let digest_writer = gzip
            .finish()
            .map_err(|e| archive_error(format!("Failed to finish gzip stream: {}", e)))?;
        let (mut buffered, digest) = digest_writer.finalize();
        buffered
            .flush()
            .map_err(|e| archive_error(format!("Failed to flush layer: {}", e)))?;
        let file = buffered
            .into_inner()
            .map_err(|e| archive_error(format!("Failed to flush layer: {}", e.error())))?;
        file.sync_all()
            .map_err(|e| archive_error(format!("Failed to sync layer: {}", e)))?;
        let size = file
            .metadata()
            .map_err(|e| archive_error(format!("Failed to stat layer: {}", e)))?
            .len();

        Ok(TarballOutput {
            path: path.to_path_buf(),
            diff_id,
            digest,
            size,
        })
    }
}

impl Default for TarballEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    path: &Path,
    entry: &FsEntry,
    mtime: u64,
) -> io::Result<()> {
    let mut header = Header::new_gnu();
    let owner = entry.ownership();
    header.set_mtime(mtime);
    header.set_uid(u64::from(owner.uid));
    header.set_gid(u64::from(owner.gid));
    header.set_mode(entry.mode);
    header.set_size(0);

    match &entry.kind {
        EntryKind::Directory => {
            header.set_entry_type(EntryType::Directory);
            builder.append_data(&mut header, path, io::empty())
        }
        EntryKind::File(contents) => {
            header.set_entry_type(EntryType::Regular);
            header.set_size(contents.len() as u64);
            builder.append_data(&mut header, path, contents.as_slice())
        }
        EntryKind::Symlink(target) => {
            header.set_entry_type(EntryType::Symlink);
            builder.append_link(&mut header, path, target)
        }
        EntryKind::Hardlink(source) => {
            header.set_entry_type(EntryType::Link);
            builder.append_link(&mut header, path, source)
        }
        EntryKind::CharDevice { major, minor } => {
            header.set_entry_type(EntryType::Char);
            header.set_device_major(*major)?;
            header.set_device_minor(*minor)?;
            builder.append_data(&mut header, path, io::empty())
        }
    }
}
