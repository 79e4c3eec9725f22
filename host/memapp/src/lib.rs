//! Physical register access through `/dev/mem`
//!
//! Every access goes through a 4 KiB window mapped from the physical memory device. Addresses are
//! rounded down to a word boundary before any I/O happens.

use std::io;

use failure::Fail;

pub mod cli;
pub mod devmem;
pub mod dispatch;
pub mod dump;
pub mod logger;
pub mod number;
pub mod word;

/// Version reported by `-v` and the help banner
pub const VERSION: &str = "1.2";

/// Everything that can go wrong while talking to the device or reading the command line
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "couldn't open {}: {}", path, cause)]
    Open {
        path: String,
        #[cause]
        cause: io::Error,
    },

    #[fail(display = "couldn't map page {:#010x}: {}", base, cause)]
    Map {
        base: u32,
        #[cause]
        cause: nix::Error,
    },

    /// An access fell outside the mapped window or wasn't word aligned
    #[fail(display = "offset {:#x} is not a word inside the {} byte window", offset, size)]
    Window {
        offset: usize,
        size: usize,
    },

    #[fail(display = "`{}` is not a base {} 32-bit number", text, radix)]
    Parse {
        text: String,
        radix: u32,
    },

    /// Bit index outside `0..=31`
    #[fail(display = "bit index {} is out of range (0..=31)", bit)]
    BitRange { bit: u32 },

    #[fail(display = "bit value {:#x} must be 0 or 1", data)]
    BitValue { data: u32 },

    #[fail(display = "listing length must be at least one byte")]
    EmptyListing,

    /// Neither `-r` nor `-w` was given
    #[fail(display = "no mode of operation selected (-r or -w)")]
    NoMode,

    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Crate wide result type
pub type Result<T> = std::result::Result<T, Error>;
