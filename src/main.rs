//! brickpage CLI
//!
//! Usage:
//!   brickpage [OPTIONS] [FILE]
//!
//! Options:
//!   -s, --settings <FILE>  Project settings (TOML format)
//!   -g, --grammar          Show the directive grammar reference
//!   -h, --help             Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use brickpage::{check_document, Meta, ProjectSettings};

#[derive(Parser)]
#[command(name = "brickpage")]
#[command(about = "Directive checker for paginated building instructions")]
struct Cli {
    /// Input model file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Project settings file (TOML format)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Show the directive grammar reference
    #[arg(short, long)]
    grammar: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.grammar {
        print_grammar();
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro
    // help.
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let settings = match &cli.settings {
        Some(path) => match ProjectSettings::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading settings '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ProjectSettings::default(),
    };

    let (source, model_name) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                (content, name)
            }
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "stdin".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut meta = Meta::new();
    settings.apply(&mut meta);

    log::info!("checking {} ({} lines)", model_name, source.lines().count());
    let (actions, diagnostics) = check_document(&mut meta, &source, &model_name);
    log::info!(
        "{} action directives, {} errors",
        actions.len(),
        diagnostics.len()
    );

    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.error.format(&diagnostic.line));
    }

    if diagnostics.is_empty() {
        println!("{}: ok ({} action directives)", model_name, actions.len());
    } else {
        println!(
            "{}: {} directive errors",
            model_name,
            diagnostics.len()
        );
        std::process::exit(1);
    }
}

fn print_intro() {
    println!(
        r#"brickpage - directive checker for paginated building instructions

USAGE:
    brickpage [OPTIONS] [FILE]
    cat model.ldr | brickpage

OPTIONS:
    -g, --grammar      Show the directive grammar reference
    -s, --settings     Project settings file (TOML)
    -h, --help         Print help

QUICK START:
    brickpage castle.ldr

Checks every layout directive in the model and reports each malformed
line with its source context. Run --grammar for the full directive
reference."#
    );
}

fn print_grammar() {
    println!("DIRECTIVE GRAMMAR");
    println!("=================");
    for line in Meta::new().documentation() {
        println!("{}", line);
    }
}
