use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, warn};

use dvb_pids_tune::app::{self, Request};
use dvb_pids_tune::context::{Cli, ParseExit, USAGE};
use dvb_pids_tune::{LinuxDvb, Settings, Shutdown};

mod logging;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let exit = ParseExit::classify(&e);
            match exit {
                ParseExit::Clap => e.exit(),
                ParseExit::Usage => println!("{}", USAGE),
                ParseExit::Invalid => {
                    let _ = e.print();
                }
            }
            return ExitCode::from(exit.exit_code().unwrap_or(1));
        }
    };

    logging::init_logging(cli.verbose);

    let settings = Settings::from_env().override_with(
        cli.adapter,
        cli.frontend,
        cli.demux,
        cli.interval,
    );
    debug!("{:?}", settings);

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || shutdown.trigger()) {
            warn!("Failed to install the termination handler: {}", e);
        }
    }

    let request = Request {
        frequency: &cli.frequency,
        pids: &cli.pids,
        limits: cli.limits(),
    };

    let mut out = io::stdout().lock();
    match app::run(&LinuxDvb, &settings, &request, &shutdown, &mut out) {
        Ok(printed) => {
            debug!("stopped after {} status line(s)", printed);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
