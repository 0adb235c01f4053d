//! Destination file for the asset download.
//!
//! Opened (and truncated) before the first request so the file exists even when
//! the transfer fails. Written sequentially, no temp file, no rename.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub struct Destination {
    out: BufWriter<File>,
    written: u64,
}

impl Destination {
    /// Create or truncate the file at `path`. The parent directory must exist.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Destination {
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append a chunk of body bytes.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.out.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Flush buffered bytes and sync to disk, closing the file. Returns total bytes written.
    pub fn finish(self) -> io::Result<u64> {
        let written = self.written;
        let file = self.out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(written)
    }
}
