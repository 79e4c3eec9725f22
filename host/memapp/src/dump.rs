//! Hex + ASCII listing of consecutive words

use std::{fmt::Write as _, io::Write};

use crate::{devmem::Registers, word, Result};

/// Bytes shown per line
pub const LINE_LEN: u32 = 16;

/// Number of words needed to cover `len` bytes
///
/// Computed like the legacy tool, in wrapping 32-bit arithmetic: `words(0)` is `0x40000000`.
pub fn words(len: u32) -> u32 {
    (len.wrapping_sub(1) / 4).wrapping_add(1)
}

/// Prints `words` words starting at `addr`, 16 bytes per line
///
/// ``` text
/// 20000000: ea00 0014 e59f f014 e59f f014 e59f f014    ................
/// ```
///
/// At least one line is printed, even when there is nothing to show.
pub fn dump<R, W>(regs: &mut R, out: &mut W, addr: u32, words: u32, big_endian: bool) -> Result<()>
where
    R: Registers + ?Sized,
    W: Write,
{
    let mut nbytes = words.wrapping_mul(4);
    let mut line_addr = word::align(addr, 4);

    loop {
        let linebytes = nbytes.min(LINE_LEN);

        let mut bytes = Vec::with_capacity(linebytes as usize);
        for i in 0..linebytes / 4 {
            let value = regs.read(word::align(line_addr.wrapping_add(i * 4), 4))?;
            bytes.extend_from_slice(&word::line_bytes(value, big_endian));
        }

        out.write_all(render(line_addr, &bytes).as_bytes())?;

        line_addr = line_addr.wrapping_add(linebytes);
        nbytes -= linebytes;
        if nbytes == 0 {
            break;
        }
    }

    Ok(())
}

/// Formats one listing line, newline included
pub fn render(addr: u32, bytes: &[u8]) -> String {
    let mut line = String::with_capacity(80);

    // NOTE writing to a `String` can't fail
    let _ = write!(line, "{:08x}:", addr);
    for (i, byte) in bytes.iter().enumerate() {
        if i % 2 == 0 {
            line.push(' ');
        }
        let _ = write!(line, "{:02x}", byte);
    }

    // keep the ASCII column aligned: 10 columns per missing word
    let missing = (4 - (bytes.len() / 4) % 4) % 4;
    for _ in 0..missing {
        line.push_str("          ");
    }
    line.push_str("    ");

    line.extend(bytes.iter().map(|&b| {
        if b < 0x20 || b > 0x7e {
            '.'
        } else {
            b as char
        }
    }));
    line.push('\n');

    line
}
