// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Concrete scan sources: raw memory, file-backed, and
// transport-backed.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, instrument};

use scanwerk_core::context::Context;
use scanwerk_core::error::Result;

use crate::device::ScanSource;

/// In-memory source replaying one image payload a fixed number of times.
///
/// Chiefly useful for tests and benchmarks.
pub struct MemorySource {
    image: Vec<u8>,
    images: usize,
    fetched: usize,
    produced: usize,
    ctx: Context,
}

impl MemorySource {
    pub fn new(image: Vec<u8>, images: usize, ctx: Context) -> Self {
        Self {
            image,
            images,
            fetched: 0,
            produced: 0,
            ctx,
        }
    }
}

impl ScanSource for MemorySource {
    fn obtain_media(&mut self) -> bool {
        if self.fetched < self.images {
            self.fetched += 1;
            true
        } else {
            false
        }
    }

    fn set_up_image(&mut self) -> bool {
        self.produced = 0;
        true
    }

    fn is_multi_image(&self) -> bool {
        self.images > 1
    }

    fn produce(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.image.len() - self.produced;
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&self.image[self.produced..self.produced + n]);
        self.produced += n;
        Ok(n)
    }

    fn context(&self) -> Context {
        self.ctx.clone()
    }
}

/// Source replaying a file's contents, one image per sheet of "media".
pub struct FileSource {
    file: File,
    images: usize,
    fetched: usize,
    ctx: Context,
}

impl FileSource {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, images: usize, ctx: Context) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        debug!("file source opened");
        Ok(Self {
            file,
            images,
            fetched: 0,
            ctx,
        })
    }
}

impl ScanSource for FileSource {
    fn obtain_media(&mut self) -> bool {
        if self.fetched < self.images {
            self.fetched += 1;
            true
        } else {
            false
        }
    }

    fn set_up_image(&mut self) -> bool {
        self.file.seek(SeekFrom::Start(0)).is_ok()
    }

    fn is_multi_image(&self) -> bool {
        self.images > 1
    }

    fn produce(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file.read(buf)?)
    }

    fn context(&self) -> Context {
        self.ctx.clone()
    }
}

/// The narrow byte-transport contract to the excluded connexion layer.
///
/// `receive` returning zero octets ends the current image.
pub trait Transport: Send {
    fn send(&mut self, data: &[u8]) -> Result<usize>;
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Source draining image octets from a byte transport.
///
/// The transport owns all wire-protocol knowledge; this source only moves
/// octets and reports the context it was configured with.
pub struct TransportSource<T: Transport> {
    transport: T,
    ctx: Context,
}

impl<T: Transport> TransportSource<T> {
    pub fn new(transport: T, ctx: Context) -> Self {
        Self { transport, ctx }
    }
}

impl<T: Transport> ScanSource for TransportSource<T> {
    fn produce(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.transport.receive(buf)
    }

    fn context(&self) -> Context {
        self.ctx.clone()
    }
}

// -- Tests --------------------------------------------------------------------
