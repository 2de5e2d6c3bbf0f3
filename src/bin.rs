use std::process;

use clap::Parser;
use log::{error, info};

use chip8_host::{cli::Args, logger};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose)?;
    info!(
        "Running {} at {} Hz ({})",
        args.rom.display(),
        args.hz,
        if args.realtime { "realtime" } else { "simulated" }
    );

    let report = chip8_host::run(&args)?;
    println!("{}", report);

    let code = report.exit_code();
    if code != 0 {
        error!("Program stopped with a fault");
        process::exit(code);
    }
    Ok(())
}
