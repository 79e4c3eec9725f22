//! Command line parsing and the fixed help, version and example texts

use std::{ffi::OsString, io::Write};

use clap::{App, AppSettings, Arg, ArgMatches};
use log::info;

use crate::{devmem::Session, number::Parsing, Error, Result, VERSION};

/// Mode of operation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Read,
    Write,
    Unset,
}

/// Legacy behavior or hardened behavior
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Policy {
    /// Coerce bad input silently, report device failures on stdout and exit successfully
    Compatible,
    /// Reject bad input and fail on device errors (`-s`)
    Strict,
}

impl Policy {
    pub fn parsing(self) -> Parsing {
        match self {
            Policy::Compatible => Parsing::Lenient,
            Policy::Strict => Parsing::Strict,
        }
    }

    pub fn session(self) -> Session {
        match self {
            Policy::Compatible => Session::PerAccess,
            Policy::Strict => Session::Reuse,
        }
    }
}

/// A register operation
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub mode: Mode,
    /// `-a`, not necessarily aligned
    pub address: u32,
    pub data: u32,
    /// `-l`, in bytes; `Some` selects listing mode
    pub length: Option<u32>,
    /// `-b`; `Some` selects bit mode
    pub bit: Option<u32>,
    pub big_endian: bool,
    pub policy: Policy,
}

impl Invocation {
    /// Whether a bit write sets (`true`) or clears the bit
    ///
    /// Only the low byte of the data counts.
    pub fn bit_value(&self) -> bool {
        self.data as u8 != 0
    }
}

/// What to do after parsing
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Help,
    Version,
    Run(Invocation),
}

/// Parsed command line
#[derive(Clone, Debug, PartialEq)]
pub struct Cli {
    /// `-E` came before any option that stops processing
    pub example: bool,
    pub action: Action,
}

impl Cli {
    fn help() -> Self {
        Cli {
            example: false,
            action: Action::Help,
        }
    }
}

fn app() -> App<'static, 'static> {
    let value = |name: &'static str, short: &'static str| {
        Arg::with_name(name)
            .short(short)
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
            .allow_hyphen_values(true)
    };
    let flag = |name: &'static str, short: &'static str| {
        Arg::with_name(name).short(short).multiple(true)
    };

    App::new("memapp")
        .setting(AppSettings::DisableHelpFlags)
        .setting(AppSettings::DisableVersion)
        .arg(flag("read", "r"))
        .arg(flag("write", "w"))
        .arg(value("address", "a"))
        .arg(value("data", "d"))
        .arg(value("length", "l"))
        .arg(value("bit", "b"))
        .arg(flag("big-endian", "e"))
        .arg(flag("strict", "s"))
        .arg(flag("show-version", "v"))
        .arg(flag("example", "E"))
        .arg(flag("show-help", "h"))
        // getopt leaves operands alone
        .arg(Arg::with_name("operands").multiple(true).hidden(true))
}

/// Parses the process arguments, program name included
///
/// Anything `getopt` would reject (unknown options, missing option values) as well as an empty
/// command line turns into `Action::Help`, unless `-h` or `-v` shows up first. Options that stop
/// processing take effect in the order they appear; `-E` only counts if it comes before them.
pub fn parse<I, T>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = args.into_iter().map(Into::into).collect::<Vec<OsString>>();

    if args.len() <= 1 {
        return Ok(Cli::help());
    }

    let (example, stop) = scan(&args[1..]);

    let matches = match app().get_matches_from_safe(args) {
        Ok(m) => m,
        Err(e) => {
            info!("{}", e.message.lines().next().unwrap_or("bad command line"));
            return Ok(Cli {
                example,
                action: stop.unwrap_or(Action::Help),
            });
        }
    };

    if let Some(action) = stop {
        return Ok(Cli { example, action });
    }

    let policy = if matches.is_present("strict") {
        Policy::Strict
    } else {
        Policy::Compatible
    };
    let parsing = policy.parsing();

    let mode = match (last("read", &matches), last("write", &matches)) {
        (Some(r), Some(w)) if w > r => Mode::Write,
        (Some(_), _) => Mode::Read,
        (None, Some(_)) => Mode::Write,
        (None, None) => Mode::Unset,
    };

    let number = |name: &str, radix| -> Result<Option<u32>> {
        value(name, &matches)
            .map(|text| parsing.parse(&text, radix))
            .transpose()
    };

    let address = number("address", 16)?.unwrap_or(0);
    let data = number("data", 16)?.unwrap_or(0);
    let length = number("length", 10)?;
    let bit = number("bit", 10)?;

    let bit = match policy {
        // the legacy tool keeps the index in a byte
        Policy::Compatible => bit.map(|b| u32::from(b as u8)),
        Policy::Strict => bit,
    };

    if policy == Policy::Strict {
        match bit {
            Some(bit) if bit >= 32 => return Err(Error::BitRange { bit }),
            Some(_) if mode == Mode::Write && data > 1 => return Err(Error::BitValue { data }),
            _ => {}
        }

        if length == Some(0) {
            return Err(Error::EmptyListing);
        }
    }

    Ok(Cli {
        example,
        action: Action::Run(Invocation {
            mode,
            address,
            data,
            length,
            bit,
            big_endian: matches.is_present("big-endian"),
            policy,
        }),
    })
}

/// Walks the options left to right like `getopt`, up to the first one that ends processing
///
/// Returns whether `-E` was seen on the way and the action that ended the walk, if any.
fn scan(args: &[OsString]) -> (bool, Option<Action>) {
    let mut example = false;
    let mut args = args.iter().map(|a| a.to_string_lossy());

    while let Some(arg) = args.next() {
        if arg == "--" {
            break;
        }
        if !arg.starts_with('-') || arg == "-" {
            // operand
            continue;
        }
        if arg.starts_with("--") {
            return (example, Some(Action::Help));
        }

        for (i, c) in arg.char_indices().skip(1) {
            match c {
                'a' | 'd' | 'l' | 'b' => {
                    // the value is the rest of this word or the next one
                    if i + 1 == arg.len() && args.next().is_none() {
                        return (example, Some(Action::Help));
                    }
                    break;
                }
                'r' | 'w' | 'e' | 's' => {}
                'E' => example = true,
                'v' => return (example, Some(Action::Version)),
                _ => return (example, Some(Action::Help)),
            }
        }
    }

    (example, None)
}

fn last(name: &str, matches: &ArgMatches) -> Option<usize> {
    matches.indices_of(name).and_then(|i| i.max())
}

fn value(name: &str, matches: &ArgMatches) -> Option<String> {
    // `strtol` sees raw bytes; anything that isn't UTF-8 just stops the number
    matches
        .values_of_os(name)
        .and_then(|v| v.last())
        .map(|v| v.to_string_lossy().into_owned())
}

/// Prints the help text; `program` is shown in the usage line
pub fn help<W>(out: &mut W, program: &str) -> Result<()>
where
    W: Write,
{
    writeln!(out, "**********************************************")?;
    writeln!(out, "*              MemApp TOOL V{}               *", VERSION)?;
    writeln!(out, "**********************************************")?;
    writeln!(out, "Usage: {} [OPTIONS...]", program)?;
    writeln!(out, "OPTIONS:")?;
    writeln!(out, "\t-r|w      Mode of operation read/write")?;
    writeln!(out, "\t-a [hex]  Address to read/write")?;
    writeln!(out, "\t-d [hex]  Data to write")?;
    writeln!(out, "\t-l [dec]  length of data to read")?;
    writeln!(out, "\t-b [dec]  Bit of data")?;
    writeln!(out, "\t-e        Big endian")?;
    writeln!(out, "\t-s        Strict argument checking")?;
    writeln!(out, "\t-h|?      This help text")?;
    writeln!(out, "\t-v        Print version")?;
    writeln!(out, "\t-E        Show example")?;
    Ok(())
}

/// Prints `version 1.2`
pub fn version<W>(out: &mut W) -> Result<()>
where
    W: Write,
{
    writeln!(out, "version {}", VERSION)?;
    Ok(())
}

/// Prints the usage examples shown by `-E`
pub fn example<W>(out: &mut W) -> Result<()>
where
    W: Write,
{
    writeln!(out, " Example:")?;
    writeln!(out, "~ # memapp -r -a 1e78502c")?;
    writeln!(out, "REG(0x1e78502c): 0x00000092")?;
    writeln!(out, "~ # memapp -r -a 1e78502c -b 0")?;
    writeln!(out, "REG(0x1e78502c): 0x00000092\t[0]=0")?;
    writeln!(out, "~ # memapp -w -a 1e78502c -b 0 -d 1")?;
    writeln!(out, "REG(0x1e78502c): 0x00000093\t[0]=1")?;
    writeln!(out, "~ # memapp -r -a 20000000 -l 16")?;
    writeln!(
        out,
        "20000000: ea00 0014 e59f f014 e59f f014 e59f f014    ................"
    )?;
    Ok(())
}
