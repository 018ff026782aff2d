mod cli;
mod logger;
mod natives;
mod repl;
mod rlpl;
mod rppl;

use std::{path::PathBuf, rc::Rc};

use clap::{Args, Parser, Subcommand};
use cli::{
    print_checked, print_checking, print_finished, print_interrupted, print_running
};
use log::{debug, error, warn};
use nettle_core::{
    environment::prelude::Environment,
    eval::prelude::{Interpreter, Options},
    optimizer::prelude::{load_from_stream, load_source},
    utils::prelude::{Error, Warning, WarningEmitterIO}
};

/// Stack of the thread running the command. The parser recurses on deeply
/// nested source; evaluation grows its own stack.
const STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Parser)]
#[command(version, about = "Interpreter for the Nettle scripting language")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); `NETTLE_LOG` overrides it
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct RunOptions {
    /// Do not fold constant expressions before running
    #[arg(long, default_value_t = false)]
    no_optimize: bool,
    /// Assigning to an undeclared variable declares it
    #[arg(long, default_value_t = false)]
    implicit_declarations: bool,
    /// Maximum depth of nested function calls
    #[arg(long, default_value_t = 256)]
    max_call_depth: usize,
}

impl From<RunOptions> for Options {
    fn from(value: RunOptions) -> Self {
        Options {
            optimize: !value.no_optimize,
            implicit_declarations: value.implicit_declarations,
            max_call_depth: value.max_call_depth,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Runs a source file
    Run {
        /// Path of source file
        path: PathBuf,
        #[command(flatten)]
        options: RunOptions,
        /// Print the ast before running
        #[arg(long, default_value_t = false)]
        print_ast: bool,
    },
    /// Performs lexical and syntactical analysis and prints the program
    /// as the interpreter sees it
    Check {
        /// Path of source file
        path: PathBuf,
        /// Do not print parsed source code
        #[arg(short, long, default_value_t = false)]
        no_output: bool,
        /// Print ast instead of parsed source code
        #[arg(long, default_value_t = false)]
        print_ast: bool,
        /// Do not fold constant expressions
        #[arg(long, default_value_t = false)]
        no_optimize: bool,
    },
    /// Runs Read Eval Print Loop
    Repl {
        #[command(flatten)]
        options: RunOptions,
    },
    /// Runs Read Lex Print Loop
    Rlpl,
    /// Runs Read Parse Print Loop
    Rppl {
        /// Print ast instead of parsed source code
        #[arg(long, default_value_t = false)]
        print_ast: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = logger::init(cli.verbose) {
        eprintln!("failed to install logger: {err}");
    }

    if let Err(err) = ctrlc::set_handler(|| {
        print_interrupted();
        std::process::exit(130);
    }) {
        warn!("failed to install signal handler: {err}");
    }

    let command = cli.command;
    let worker = std::thread::Builder::new()
        .name("nettle".into())
        .stack_size(STACK_SIZE)
        .spawn(move || execute(command));

    let code = match worker.map(|handle| handle.join()) {
        Ok(Ok(code)) => code,
        Ok(Err(_)) => {
            error!("interpreter thread panicked");
            101
        },
        Err(err) => {
            error!("failed to start interpreter thread: {err}");
            1
        }
    };

    std::process::exit(code);
}

fn execute(command: Command) -> i32 {
    let warnings: Rc<dyn WarningEmitterIO> = Rc::new(ConsoleWarningEmitter);

    let result = match command {
        Command::Run { path, options, print_ast } => run(path, options.into(), print_ast, warnings),
        Command::Check { path, no_output, print_ast, no_optimize } => {
            print_checking(&path.display().to_string());
            let start = std::time::Instant::now();

            load_from_stream(path, warnings, !no_optimize).map(|program| {
                if !no_output {
                    if print_ast {
                        println!("{program:#?}");
                    } else {
                        println!("{program}");
                    }
                }

                print_checked(start.elapsed());
            })
        },
        Command::Repl { options } => repl::start(options.into(), warnings)
            .map_err(|err| Error::StdIo { err: err.kind() }),
        Command::Rlpl => rlpl::start()
            .map_err(|err| Error::StdIo { err: err.kind() }),
        Command::Rppl { print_ast } => rppl::start(print_ast)
            .map_err(|err| Error::StdIo { err: err.kind() }),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            let buffer_writer = cli::stderr_buffer_writer();
            let mut buffer = buffer_writer.buffer();

            err.pretty(&mut buffer);
            buffer_writer
                .print(&buffer)
                .expect("Writing error to stderr");

            1
        }
    }
}

fn run(
    path: PathBuf,
    options: Options,
    print_ast: bool,
    warnings: Rc<dyn WarningEmitterIO>
) -> Result<(), Error> {
    print_running(&path.display().to_string());
    let start = std::time::Instant::now();

    let src = std::fs::read_to_string(&path)
        .map_err(|err| Error::StdIo { err: err.kind() })?;

    let program = load_source(path.clone(), src.clone(), warnings.clone(), options.optimize)?;

    if print_ast {
        println!("{program:#?}");
    }

    debug!("running with {options:?}");

    let mut interpreter = Interpreter::new(options);
    natives::install(&mut interpreter, warnings);

    interpreter.run(&program, &Environment::global())
        .map_err(|error| Error::Runtime { path, src, error })?;

    print_finished(start.elapsed());

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct ConsoleWarningEmitter;

impl WarningEmitterIO for ConsoleWarningEmitter {
    fn emit_warning(&self, warning: Warning) {
        let buffer_writer = crate::cli::stderr_buffer_writer();
        let mut buffer = buffer_writer.buffer();
        warning.pretty(&mut buffer);
        buffer_writer
            .print(&buffer)
            .expect("Writing warning to stderr");
    }
}
