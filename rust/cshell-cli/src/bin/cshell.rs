//! cshell: execute C/C++ statements in an interactive shell.

use clap::Parser as ClapParser;
use std::path::PathBuf;

use cshell_cli::colors::{bold, cyan, gray, red, status_label, yellow};
use cshell_cli::config::{CshellConfig, CONFIG_FILE};
use cshell_cli::repl::{self, Options};
use cshell_cli::startup::{self, Overrides};
use cshell_cli::{logging, CliError};
use cshell_core::compiler::COMPILER_ENV;

#[derive(ClapParser)]
#[command(
    name = "cshell",
    version,
    about = "Execute C/C++ statements in an interactive shell"
)]
struct Cli {
    /// Compiler driver (gcc, g++, cc, c++, clang, clang++)
    #[arg(long)]
    compiler: Option<String>,

    /// Load this config file instead of searching for cshell.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Header to include from the start (repeatable)
    #[arg(short = 'I', long = "include")]
    includes: Vec<String>,

    /// Library to link from the start (repeatable)
    #[arg(short = 'l', long = "library")]
    libraries: Vec<String>,

    /// Extra compiler argument (repeatable)
    #[arg(long = "cflag", allow_hyphen_values = true)]
    cflags: Vec<String>,

    /// Read lines from a file instead of the terminal
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print the generated program before each build
    #[arg(long)]
    show_source: bool,

    /// Do not print the startup banner
    #[arg(long)]
    no_banner: bool,

    /// Write a default cshell.toml to the current directory and exit
    #[arg(long)]
    init: bool,

    /// Arguments passed to the generated program
    #[arg(last = true)]
    program_args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    if cli.init {
        cmd_init();
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("{} {}", red("error:"), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => CshellConfig::load_from(path)?,
        None => match CshellConfig::load_with_path()? {
            Some((path, cfg)) => {
                tracing::debug!(path = %path.display(), "loaded config");
                cfg
            }
            None => CshellConfig::default(),
        },
    };

    let env_compiler = std::env::var(COMPILER_ENV).ok();
    let overrides = Overrides {
        compiler: cli.compiler,
        includes: cli.includes,
        libraries: cli.libraries,
        cflags: cli.cflags,
        program_args: cli.program_args,
    };
    let startup::Assembled { mut repl, warning } =
        startup::assemble(&config, overrides, env_compiler.as_deref());

    if let Some(warning) = warning {
        eprintln!("{} {}", yellow("Warning:"), warning);
    }

    let opts = Options {
        show_source: cli.show_source,
        history_file: config.history_file.clone(),
    };

    match cli.script {
        Some(path) => repl::run_script_file(&mut repl, &path, &opts),
        None => {
            if !cli.no_banner {
                print_banner(repl.executor().compiler().program());
            }
            repl::run_interactive(&mut repl, &opts)
        }
    }
}

fn print_banner(compiler: &str) {
    println!(
        "{} {}",
        bold(&cyan("cshell")),
        gray(&format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    println!("{}", gray(&format!("Using \"{compiler}\" compiler.")));
    println!(
        "{}\n",
        gray("Type :help for available commands, :quit or Ctrl-D to exit.")
    );
}

fn cmd_init() {
    let path = PathBuf::from(CONFIG_FILE);
    if path.exists() {
        eprintln!("{} {} already exists, not overwriting", red("error:"), CONFIG_FILE);
        std::process::exit(1);
    }
    if let Err(e) = std::fs::write(&path, CshellConfig::default_template()) {
        eprintln!("{} writing {}: {}", red("error:"), CONFIG_FILE, e);
        std::process::exit(1);
    }
    println!("{} {}", status_label("Created"), CONFIG_FILE);
}
