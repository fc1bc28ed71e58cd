use std::io::{Write, stdout};

use calc_session::format::format_result;
use calc_session::{Conversion, Lexer, Session, SessionConfig, Snapshot};
use clap::Parser;
use clap::Subcommand;
use miette::{IntoDiagnostic, Report};

#[derive(Parser, Debug)]
struct Args {
    /// Log session activity at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Tokenize {
        expression: String,
    },
    Parse {
        expression: String,
    },
    Eval {
        expression: String,
    },
    /// Interactive session; `:help` lists the commands.
    Repl {
        #[arg(long)]
        history_limit: Option<usize>,
    },
}

const REPL_HELP: &str = "\
text        append to the input
=           calculate
:back       delete the last character
:clear      clear the input
:undo       undo the last edit
:redo       redo an undone edit
:history    list past calculations
:reuse N    put history entry N back into the input
:ms :m+     store / add the input's value to memory
:mr :mc     recall / clear memory
:convert K  convert the input (m-ft, ft-m, kg-lb, lb-kg, km-mi, mi-km)
:quit       leave";

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Commands::Tokenize { expression } => {
            for token in Lexer::new(&expression) {
                let token = match token {
                    Ok(token) => token,
                    Err(e) => return Err(Report::new(e).with_source_code(expression.clone())),
                };
                println!("{token}");
            }
            println!("EOF");
        }
        Commands::Parse { expression } => {
            let tokens = calc_session::tokenize(&expression)
                .map_err(|e| Report::new(e).with_source_code(expression.clone()))?;
            let expr = calc_session::parse(&tokens)
                .map_err(|e| Report::new(e).with_source_code(expression.clone()))?;
            println!("{expr}");
        }
        Commands::Eval { expression } => {
            let value = calc_session::evaluate_str(&expression)
                .map_err(|e| Report::new(e).with_source_code(expression.clone()))?;
            println!("{}", format_result(value));
        }
        Commands::Repl { history_limit } => repl(SessionConfig { history_limit })?,
    }
    Ok(())
}

fn repl(config: SessionConfig) -> miette::Result<()> {
    let mut session = Session::new(config);
    show(&session.snapshot())?;

    for line in std::io::stdin().lines() {
        let line = line.into_diagnostic()?;
        let line = line.trim_end_matches(['\r', '\n']);

        let (command, argument) = match line.split_once(' ') {
            Some((command, argument)) if line.starts_with(':') => (command, argument.trim()),
            _ => (line, ""),
        };

        let snapshot = match command {
            "" => session.snapshot(),
            "=" => {
                let input = session.input().to_string();
                match session.calculate() {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        eprintln!("{:?}", Report::new(e).with_source_code(input));
                        session.snapshot()
                    }
                }
            }
            ":back" => session.backspace(),
            ":clear" => session.clear(),
            ":undo" => session.undo(),
            ":redo" => session.redo(),
            ":ms" => session.memory_store(),
            ":m+" => session.memory_add(),
            ":mr" => session.memory_recall(),
            ":mc" => session.memory_clear(),
            ":history" => {
                for (index, entry) in session.history_entries().enumerate() {
                    println!("[{index}] {} = {}", entry.input, entry.result);
                }
                continue;
            }
            ":reuse" => match argument.parse() {
                Ok(index) => session.reuse_from_history(index),
                Err(_) => {
                    eprintln!("usage: :reuse N");
                    continue;
                }
            },
            ":convert" => match argument.parse::<Conversion>() {
                Ok(conversion) => session.convert_units(conversion),
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            },
            ":help" => {
                println!("{REPL_HELP}");
                continue;
            }
            ":quit" => break,
            _ if command.starts_with(':') => {
                eprintln!("unknown command `{command}`, try :help");
                continue;
            }
            text => session.append(text),
        };
        show(&snapshot)?;
    }
    Ok(())
}

fn show(snapshot: &Snapshot) -> miette::Result<()> {
    match &snapshot.preview {
        Some(preview) => print!("{}   = {preview}\n> ", snapshot.text),
        None => print!("{}\n> ", snapshot.text),
    }
    stdout().flush().into_diagnostic()
}
