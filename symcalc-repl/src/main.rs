mod error;
mod session;

use rustyline::{error::ReadlineError, DefaultEditor};
use session::{Command, Session};
use std::{fs, io::{self, IsTerminal, Read}, process::ExitCode};
use tracing_subscriber::EnvFilter;

/// Parses and runs one line, printing the result or the error.
fn read_eval(line: &str, session: &mut Session) {
    if line.trim().is_empty() {
        return;
    }

    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(err) => return err.report_to_stderr(line),
    };
    match session.run(command) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => (), // intentionally print nothing
        Err(err) => err.report_to_stderr(command.source()),
    }
}

/// Runs every line of the input in a fresh session.
fn execute(input: &str) {
    let mut session = Session::new();
    for line in input.lines() {
        read_eval(line, &mut session);
    }
}

fn process_line(rl: &mut DefaultEditor, session: &mut Session) -> Result<(), ReadlineError> {
    let input = rl.readline("> ")?;
    if input.trim().is_empty() {
        return Ok(());
    }

    rl.add_history_entry(&input)?;
    read_eval(&input, session);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args();
    args.next();

    if let Some(filename) = args.next() {
        // run source file
        match fs::read_to_string(&filename) {
            Ok(input) => execute(&input),
            Err(err) => {
                eprintln!("could not read {}: {}", filename, err);
                return ExitCode::FAILURE;
            },
        }
    } else if !io::stdin().is_terminal() {
        // read source from stdin
        let mut input = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut input) {
            eprintln!("could not read stdin: {}", err);
            return ExitCode::FAILURE;
        }
        execute(&input);
    } else {
        // run the repl / interactive mode
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(err) => {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            },
        };
        let mut session = Session::new();

        loop {
            if let Err(err) = process_line(&mut rl, &mut session) {
                match err {
                    ReadlineError::Eof | ReadlineError::Interrupted => (),
                    _ => eprintln!("{}", err),
                }
                break;
            }
        }
    }

    ExitCode::SUCCESS
}
