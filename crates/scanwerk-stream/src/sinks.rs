// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Concrete consumers: shared in-memory sink and one-file-per-
// image file sink.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument, warn};

use scanwerk_core::context::Context;
use scanwerk_core::error::Result;

use crate::consumer::Consumer;

#[derive(Default)]
struct VecSinkState {
    data: Vec<u8>,
    sequences_completed: u32,
    images_completed: u32,
    cancelled: bool,
    /// Consume at most this many octets per write when set.
    max_chunk: Option<usize>,
}

/// In-memory consumer whose contents remain observable through clones.
///
/// Cloning yields another handle onto the same storage, so a test can
/// hand one clone to a pump worker and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct VecSink {
    state: Arc<Mutex<VecSinkState>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that consumes at most `n` octets per write, to exercise
    /// partial-consumption retry paths.
    pub fn with_max_chunk(n: usize) -> Self {
        let sink = Self::new();
        sink.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .max_chunk = Some(n);
        sink
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecSinkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Everything consumed so far.
    pub fn data(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    pub fn images_completed(&self) -> u32 {
        self.lock().images_completed
    }

    pub fn sequences_completed(&self) -> u32 {
        self.lock().sequences_completed
    }

    pub fn cancelled(&self) -> bool {
        self.lock().cancelled
    }
}

impl Consumer for VecSink {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut state = self.lock();
        let n = state.max_chunk.map_or(data.len(), |m| m.min(data.len()));
        state.data.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn end_image(&mut self, _ctx: &Context) -> Result<()> {
        self.lock().images_completed += 1;
        Ok(())
    }

    fn end_sequence(&mut self, _ctx: &Context) -> Result<()> {
        self.lock().sequences_completed += 1;
        Ok(())
    }

    fn cancel_sequence(&mut self, _ctx: &Context) -> Result<()> {
        self.lock().cancelled = true;
        Ok(())
    }
}

/// Consumer writing each image of a sequence to its own numbered file.
///
/// Files are named `<basename>-NNN.raw` under `dir`.  A cancelled image's
/// partial file is deleted.
pub struct FileSink {
    dir: PathBuf,
    basename: String,
    current: Option<(PathBuf, File)>,
    index: u32,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, basename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            basename: basename.into(),
            current: None,
            index: 0,
        }
    }

    /// Number of completed image files.
    pub fn images_written(&self) -> u32 {
        self.index
    }
}

impl Consumer for FileSink {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        match self.current.as_mut() {
            Some((_, file)) => {
                file.write_all(data)?;
                Ok(data.len())
            }
            // Octets outside an image boundary carry no meaning here.
            None => Ok(data.len()),
        }
    }

    #[instrument(skip_all)]
    fn begin_image(&mut self, _ctx: &Context) -> Result<()> {
        let path = self
            .dir
            .join(format!("{}-{:03}.raw", self.basename, self.index));
        debug!(path = %path.display(), "image file opened");
        let file = File::create(&path)?;
        self.current = Some((path, file));
        Ok(())
    }

    fn end_image(&mut self, _ctx: &Context) -> Result<()> {
        if let Some((path, file)) = self.current.take() {
            file.sync_all()?;
            self.index += 1;
            info!(path = %path.display(), "image file completed");
        }
        Ok(())
    }

    fn cancel_sequence(&mut self, _ctx: &Context) -> Result<()> {
        if let Some((path, file)) = self.current.take() {
            drop(file);
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "partial image file left behind");
            } else {
                info!(path = %path.display(), "partial image file removed");
            }
        }
        Ok(())
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::marker::Marker;

    /// Clones observe writes made through any handle.
    #[test]
    fn vec_sink_clones_share_storage() {
        let sink = VecSink::new();
        let mut handle = sink.clone();
        handle.write(b"shared").expect("write");
        assert_eq!(sink.data(), b"shared");
    }

    /// `with_max_chunk` produces the partial consumption it promises.
    #[test]
    fn vec_sink_max_chunk_limits_writes() {
        let mut sink = VecSink::with_max_chunk(3);
        assert_eq!(sink.write(b"abcdef").expect("write"), 3);
        assert_eq!(sink.data(), b"abc");
    }

    /// One file per image, numbered in order, with contents separated.
    #[test]
    fn file_sink_writes_one_file_per_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = FileSink::new(dir.path(), "scan");
        let ctx = Context::default();

        sink.mark(Marker::BeginOfSequence, &ctx).expect("bos");
        for fill in [0x11u8, 0x22] {
            sink.mark(Marker::BeginOfImage, &ctx).expect("boi");
            sink.write(&[fill; 64]).expect("write");
            sink.mark(Marker::EndOfImage, &ctx).expect("eoi");
        }
        sink.mark(Marker::EndOfSequence, &ctx).expect("eos");

        assert_eq!(sink.images_written(), 2);
        let first = fs::read(dir.path().join("scan-000.raw")).expect("first image");
        let second = fs::read(dir.path().join("scan-001.raw")).expect("second image");
        assert_eq!(first, vec![0x11; 64]);
        assert_eq!(second, vec![0x22; 64]);
    }

    /// Cancellation removes the in-flight partial file but keeps
    /// completed ones.
    #[test]
    fn file_sink_cancel_removes_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = FileSink::new(dir.path(), "scan");
        let ctx = Context::default();

        sink.mark(Marker::BeginOfImage, &ctx).expect("boi");
        sink.write(&[0x33; 16]).expect("write");
        sink.mark(Marker::EndOfImage, &ctx).expect("eoi");

        sink.mark(Marker::BeginOfImage, &ctx).expect("boi");
        sink.write(&[0x44; 8]).expect("write");
        sink.mark(Marker::Cancel, &ctx).expect("cancel");

        assert!(dir.path().join("scan-000.raw").exists());
        assert!(!dir.path().join("scan-001.raw").exists());
    }
}
