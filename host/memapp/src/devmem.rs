//! Register access through `/dev/mem`

use std::{
    fs::{File, OpenOptions},
    num::NonZeroUsize,
    os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    path::{Path, PathBuf},
    ptr,
};

use log::{debug, trace};
use nix::{
    fcntl::OFlag,
    libc,
    sys::mman::{self, MapFlags, ProtFlags},
};

use crate::{Error, Result};

/// Default physical memory device
pub const DEV_MEM: &str = "/dev/mem";

/// Size of the window mapped for each access
pub const PAGE_SIZE: usize = 4096;

/// Offset of an address inside its window
pub const PAGE_MASK: u32 = PAGE_SIZE as u32 - 1;

const WINDOW: NonZeroUsize = match NonZeroUsize::new(PAGE_SIZE) {
    Some(size) => size,
    None => panic!("empty window"),
};

/// 32-bit register file
///
/// Addresses handed to implementations are already word aligned.
pub trait Registers {
    /// Reads the word at `addr`
    fn read(&mut self, addr: u32) -> Result<u32>;

    /// Writes `value` to the word at `addr`
    fn write(&mut self, addr: u32, value: u32) -> Result<()>;
}

/// One page of the device mapped into our address space
///
/// The page is unmapped and the device closed when this value is dropped.
pub struct Mapping {
    base: *mut u8,
    page: u32,
    // closed after `munmap`, see `Drop`
    _device: File,
}

impl Mapping {
    /// Maps the page of `device` that contains `addr`
    pub fn open(device: &Path, addr: u32) -> Result<Self> {
        let page = addr & !PAGE_MASK;

        let f = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlag::O_SYNC.bits())
            .open(device)
            .map_err(|cause| Error::Open {
                path: device.display().to_string(),
                cause,
            })?;

        let base = unsafe {
            mman::mmap(
                None,
                WINDOW,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                f.as_raw_fd(),
                page as libc::off_t,
            )
        }
        .map_err(|cause| Error::Map { base: page, cause })?;

        debug!("mapped {:#010x} from {}", page, device.display());

        Ok(Mapping {
            base: base as *mut u8,
            page,
            _device: f,
        })
    }

    /// Physical address of the first byte of the window
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Volatile read of the word at `offset`
    pub fn read32(&self, offset: usize) -> Result<u32> {
        let p = self.word(offset)?;

        // NOTE(unsafe) in bounds and aligned, see `word`
        let value = unsafe { ptr::read_volatile(p) };
        trace!("{:#010x} -> {:#010x}", self.page + offset as u32, value);
        Ok(value)
    }

    /// Volatile write of `value` to the word at `offset`
    pub fn write32(&self, offset: usize, value: u32) -> Result<()> {
        let p = self.word(offset)?;

        trace!("{:#010x} <- {:#010x}", self.page + offset as u32, value);
        // NOTE(unsafe) in bounds and aligned, see `word`
        unsafe { ptr::write_volatile(p, value) }
        Ok(())
    }

    fn word(&self, offset: usize) -> Result<*mut u32> {
        if offset % 4 != 0 || offset > PAGE_SIZE - 4 {
            return Err(Error::Window {
                offset,
                size: PAGE_SIZE,
            });
        }

        Ok(self.base.wrapping_add(offset) as *mut u32)
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // nothing sensible to do if this fails
        let _ = unsafe { mman::munmap(self.base as *mut libc::c_void, PAGE_SIZE) };
        debug!("unmapped {:#010x}", self.page);
    }
}

/// How long a mapping lives
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Session {
    /// Open, map, access, unmap and close for every single word
    PerAccess,
    /// Keep the last page mapped while accesses stay inside it
    Reuse,
}

/// `Registers` backed by a physical memory device
pub struct PhysMem {
    device: PathBuf,
    session: Session,
    current: Option<Mapping>,
    mappings: usize,
}

impl PhysMem {
    /// Accesses `device` (usually `/dev/mem`)
    pub fn new<P>(device: P, session: Session) -> Self
    where
        P: Into<PathBuf>,
    {
        PhysMem {
            device: device.into(),
            session,
            current: None,
            mappings: 0,
        }
    }

    /// Number of pages mapped so far
    pub fn mappings(&self) -> usize {
        self.mappings
    }

    fn with_window<T, F>(&mut self, addr: u32, f: F) -> Result<T>
    where
        F: FnOnce(&Mapping, usize) -> Result<T>,
    {
        let page = addr & !PAGE_MASK;

        let mapping = match self.current.take() {
            Some(m) if m.page() == page => m,
            stale => {
                drop(stale);
                let m = Mapping::open(&self.device, page)?;
                self.mappings += 1;
                m
            }
        };

        let res = f(&mapping, (addr & PAGE_MASK) as usize);

        if self.session == Session::Reuse {
            self.current = Some(mapping);
        }

        res
    }
}

impl Registers for PhysMem {
    fn read(&mut self, addr: u32) -> Result<u32> {
        self.with_window(addr, |m, offset| m.read32(offset))
    }

    fn write(&mut self, addr: u32, value: u32) -> Result<()> {
        self.with_window(addr, |m, offset| m.write32(offset, value))
    }
}

/// In-memory register file
#[cfg(test)]
#[derive(Default)]
pub(crate) struct Fake {
    pub words: std::collections::BTreeMap<u32, u32>,
    pub reads: Vec<u32>,
    pub writes: Vec<(u32, u32)>,
    pub fail: Option<fn(u32) -> Error>,
}

#[cfg(test)]
impl Fake {
    pub fn with(words: &[(u32, u32)]) -> Self {
        Fake {
            words: words.iter().cloned().collect(),
            ..Fake::default()
        }
    }
}

#[cfg(test)]
impl Registers for Fake {
    fn read(&mut self, addr: u32) -> Result<u32> {
        if let Some(fail) = self.fail {
            return Err(fail(addr));
        }

        self.reads.push(addr);
        Ok(self.words.get(&addr).cloned().unwrap_or(0))
    }

    fn write(&mut self, addr: u32, value: u32) -> Result<()> {
        if let Some(fail) = self.fail {
            return Err(fail(addr));
        }

        self.writes.push((addr, value));
        self.words.insert(addr, value);
        Ok(())
    }
}
