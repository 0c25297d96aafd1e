use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use quill::ast_printer::AstPrinter;
use quill::interpreter::Interpreter;
use quill::parser::Parser;
use quill::scanner;
use quill::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Quill language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable logging to quill.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses input from a file and prints each statement's AST
    Parse { filename: PathBuf },

    /// Runs a Quill program from a file, or starts a REPL when no file is given
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a source string.  The scanner requires
/// valid UTF-8, so decoding failures surface here, before any stage runs.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let source = String::from_utf8(buf)
        .map_err(quill::error::QuillError::from)
        .context(format!("File {:?} is not valid UTF-8", filename))?;

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("quill.log").context("Failed to create quill.log")?;

    // Write to file with module path and source line for each record.
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("quill::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to quill.log");

    Ok(())
}

/// Scan, parse, and interpret one source buffer against a (possibly
/// long-lived) interpreter.  Each stage gates the next: lex errors suppress
/// parsing, a parse failure suppresses interpretation.  Errors are printed
/// to stderr; the returned exit code is `None` on success, `65` for
/// lex/parse errors, `70` for a runtime error.
fn run_source(interpreter: &mut Interpreter, source: &str) -> Option<i32> {
    let (tokens, lex_errors) = scanner::scan(source);

    if !lex_errors.is_empty() {
        for e in &lex_errors {
            eprintln!("{}", e);
        }

        debug!("{} lex errors, suppressing parse", lex_errors.len());

        return Some(65);
    }

    let statements = match Parser::new(&tokens).parse() {
        Ok(statements) => statements,

        Err(errors) => {
            for e in &errors {
                eprintln!("{}", e);
            }

            debug!("{} syntax errors, suppressing interpretation", errors.len());

            return Some(65);
        }
    };

    info!("Parsed {} statements", statements.len());

    if let Err(e) = interpreter.interpret(&statements) {
        eprintln!("{}", e);

        return Some(70);
    }

    None
}

/// Interactive read-eval loop.  One interpreter (and hence one global
/// environment) persists across inputs; per-line errors are reported and the
/// loop continues.
fn run_prompt() -> Result<()> {
    println!("Welcome to Quill!");

    let mut interpreter = Interpreter::new();
    let stdin = std::io::stdin();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        run_source(&mut interpreter, trimmed);
    }

    println!("Goodbye!");

    Ok(())
}

fn run_file(filename: &Path) -> Result<()> {
    let buf = read_file(filename)?;

    let mut interpreter = Interpreter::new();

    if let Some(code) = run_source(&mut interpreter, &buf) {
        std::process::exit(code);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.command {
        Some(Commands::Tokenize { filename }) => {
            info!("Running Tokenize subcommand");

            let buf = read_file(&filename)?;
            let mut tokenized = true;

            for token in Scanner::new(&buf) {
                match token {
                    Ok(token) => {
                        debug!("Scanned token: {}", token);

                        println!("{}", token);
                    }

                    Err(e) => {
                        tokenized = false;

                        eprintln!("{}", e);
                    }
                }
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code 65");

                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Some(Commands::Parse { filename }) => {
            info!("Running Parse subcommand");

            let buf = read_file(&filename)?;
            let (tokens, lex_errors) = scanner::scan(&buf);

            if !lex_errors.is_empty() {
                for e in &lex_errors {
                    eprintln!("{}", e);
                }

                std::process::exit(65);
            }

            match Parser::new(&tokens).parse() {
                Ok(statements) => {
                    info!("Parsed {} statements", statements.len());

                    let printer = AstPrinter;

                    for stmt in &statements {
                        println!("{}", printer.print_stmt(stmt));
                    }
                }

                Err(errors) => {
                    for e in &errors {
                        eprintln!("{}", e);
                    }

                    std::process::exit(65);
                }
            }

            info!("Parse subcommand completed");
        }

        Some(Commands::Run {
            filename: Some(filename),
        }) => {
            info!("Running Run subcommand on {:?}", filename);

            run_file(&filename)?;
        }

        Some(Commands::Run { filename: None }) | None => {
            info!("No file given, starting REPL");

            run_prompt()?;
        }
    }

    Ok(())
}
