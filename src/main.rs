use kstale::args::{args, Arguments, ArgumentsParser};
use kstale::commands;
use kstale::core::open_directory;
use kstale::utils;
use kstale::Result;
use log::info;
use std::io;
use std::process;

fn main() {
    let matches = args().get_matches();

    let result = ArgumentsParser::parse(&matches).and_then(|args| {
        init_log(args.verbosity);
        return main_inner(args);
    });

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        process::exit(error.exit_code());
    }
}

fn init_log(verbosity: usize) {
    if let Err(err) = stderrlog::new()
        .module(module_path!())
        .verbosity(verbosity)
        .init()
    {
        eprintln!("Unable to initialize the log: {}", err);
    }
}

fn main_inner(args: Arguments) -> Result<()> {
    let database = utils::get_database_file(args.database.clone())?;
    let directory = open_directory(&database, &args.realm, true)?;
    info!("Audit realm {} from {}", args.realm, directory.id());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::stale(
        &*directory,
        &args.filter_config(),
        args.principals_file.as_deref(),
        &args.pattern,
        &mut out,
    )?;

    return Ok(());
}
