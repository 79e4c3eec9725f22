use std::{
    env,
    io::{self, Write},
    path::PathBuf,
};

use exitfailure::ExitFailure;
use log::debug;
use memapp::{
    cli::{self, Action},
    devmem::{PhysMem, DEV_MEM},
    dispatch, logger,
};

/// Overrides the physical memory device
const DEVICE_ENV: &str = "MEMAPP_DEVICE";

fn main() -> Result<(), ExitFailure> {
    logger::init(logger::level(env::var(logger::ENV).ok().as_deref()))?;

    let args = env::args_os().collect::<Vec<_>>();
    let program = args
        .first()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "memapp".to_owned());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let cli = cli::parse(args)?;
    if cli.example {
        cli::example(&mut out)?;
    }

    match cli.action {
        Action::Help => cli::help(&mut out, &program)?,
        Action::Version => cli::version(&mut out)?,
        Action::Run(inv) => {
            let device = env::var_os(DEVICE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEV_MEM));
            debug!("{:?} on {}", inv, device.display());

            let mut mem = PhysMem::new(device, inv.policy.session());
            dispatch::execute(&inv, &mut mem, &mut out)?;
        }
    }

    out.flush()?;

    Ok(())
}
