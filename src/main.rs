
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate regex;
extern crate term_grid;

pub mod compiler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs;

use compiler::error::CompileError;
use compiler::memory::Memory;
use compiler::Compiler;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    let path = args.value_of("INPUT").unwrap();
    let source = match fs::read_to_string(path) {
        Err(err) => {
            error!("fatal: could not open file {}: {}", path, err);
            std::process::exit(2);
        }
        Ok(text) => text,
    };

    let mut compiler = Compiler::new(path);
    compiler.read_source(&source);

    if let Err(err) = compiler.compile() {
        error!("{}: {}", compiler.path(), err);
        std::process::exit(match err {
            CompileError::OutOfMemory => 4,
            _ => 3,
        });
    }

    let exit_value = match compiler.run() {
        Ok(value) => value,
        Err(err) => {
            error!("{}: {}", compiler.path(), err);
            std::process::exit(err.status());
        }
    };

    if let Some(count) = args.value_of("dump") {
        match count.parse::<usize>() {
            Ok(count) => dump_memory(compiler.memory(), count),
            Err(_) => warn!("ignoring non-numeric cell count for -d: {}", count),
        }
    }

    std::process::exit(exit_value);
}

/// Prints the first `count` memory cells in a three-column grid.
fn dump_memory(mem: &Memory, count: usize) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (idx, cell) in mem.snapshot(count).iter().enumerate() {
        grid.add(Cell::from(format!("Cell {}:", idx)));
        grid.add(Cell::from(
            if cell.occupied { "occupied" } else { "free" }.to_string(),
        ));
        grid.add(Cell::from(format!("{}", cell.value)));
    }

    println!("{}", grid.fit_into_columns(3));
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the program file to compile and run")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("dump")
            .short("d")
            .alias("dump-memory")
            .takes_value(true)
            .help("dumps the first N memory cells after the program halts"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stderr())
        .apply().ok();
}
