//! Executes a parsed invocation against a register file

use std::io::Write;

use log::{debug, info};

use crate::{
    cli::{Invocation, Mode, Policy},
    devmem::Registers,
    dump, word, Error, Result,
};

/// Runs `inv`, printing the results to `out`
///
/// Under `Policy::Compatible` device failures are reported on `out` with the legacy messages and
/// are not treated as errors; the access is abandoned either way.
pub fn execute<R, W>(inv: &Invocation, regs: &mut R, out: &mut W) -> Result<()>
where
    R: Registers + ?Sized,
    W: Write,
{
    match run(inv, regs, out) {
        Err(Error::Open { path, cause }) if inv.policy == Policy::Compatible => {
            info!("couldn't open {}: {}", path, cause);
            writeln!(out, "open /dev/mem error!")?;
            Ok(())
        }
        Err(Error::Map { base, cause }) if inv.policy == Policy::Compatible => {
            info!("couldn't map {:#010x}: {}", base, cause);
            writeln!(out, "map base is NULL!")?;
            Ok(())
        }
        res => res,
    }
}

fn run<R, W>(inv: &Invocation, regs: &mut R, out: &mut W) -> Result<()>
where
    R: Registers + ?Sized,
    W: Write,
{
    let reg = word::align(inv.address, 4);

    match inv.mode {
        Mode::Unset => {
            if inv.policy == Policy::Strict {
                return Err(Error::NoMode);
            }

            debug!("no mode selected; nothing to do");
        }

        Mode::Read => {
            if let Some(len) = inv.length {
                dump::dump(regs, out, inv.address, dump::words(len), inv.big_endian)?;
            } else {
                let value = regs.read(reg)?;
                report(out, "", reg, value, inv.bit)?;
            }
        }

        Mode::Write => {
            if let Some(bit) = inv.bit {
                let value = regs.read(reg)?;

                match word::write_bit(value, bit, inv.bit_value()) {
                    Some(new) => regs.write(reg, new)?,
                    None => info!("bit {} is out of range; {:#010x} left untouched", bit, reg),
                }

                let value = regs.read(reg)?;
                report(out, "", reg, value, Some(bit))?;
            } else {
                regs.write(reg, inv.data)?;

                let value = regs.read(reg)?;
                report(out, " ", reg, value, None)?;
            }
        }
    }

    Ok(())
}

fn report<W>(out: &mut W, indent: &str, reg: u32, value: u32, bit: Option<u32>) -> Result<()>
where
    W: Write,
{
    match bit.and_then(|bit| word::read_bit(value, bit).map(|b| (bit, b))) {
        Some((bit, b)) => writeln!(
            out,
            "{}REG(0x{:08x}): 0x{:08x}\t[{}]={}",
            indent, reg, value, bit, b
        )?,
        None => {
            if let Some(bit) = bit {
                info!("bit {} is out of range; showing the whole word", bit);
            }

            writeln!(out, "{}REG(0x{:08x}): 0x{:08x}", indent, reg, value)?
        }
    }

    Ok(())
}
