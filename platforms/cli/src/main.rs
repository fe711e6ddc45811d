use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use std::path::PathBuf;
use std::process::ExitCode;
use turing_omega::programs::Device;
use turing_omega::{
    export_state_transitions, Evaluator, Machine, ProgramLoader, TuringError, CATALOG,
    DEFAULT_TAPE,
};

/// Run, encode, and decode binary classifiers and two-symbol Turing machines.
#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
#[command(after_help = "EXAMPLES:
  omega-cli eval --builtin div3 3 4 5
  omega-cli run --bits 11011001001001001001101010001001100100100100100110100100100110 --trace
  omega-cli encode machine --program programs/busy-beaver.json --as-integer
  omega-cli decode evaluator --integer 74164")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify values with an evaluator
    Eval {
        #[command(flatten)]
        source: Source,

        /// Values to classify
        #[arg(required = true)]
        values: Vec<u64>,
    },
    /// Run a machine until it halts
    Run {
        #[command(flatten)]
        source: Source,

        /// The initial tape
        #[arg(short, long, default_value = DEFAULT_TAPE)]
        tape: String,

        /// Print each step of the execution
        #[arg(short = 'd', long)]
        trace: bool,
    },
    /// Print the canonical bitstring of a device
    Encode {
        #[arg(value_enum)]
        kind: Kind,

        #[command(flatten)]
        source: Source,

        /// Print the bitstring read as an integer instead
        #[arg(long = "as-integer")]
        as_integer: bool,
    },
    /// Print the JSON literal of a device
    Decode {
        #[arg(value_enum)]
        kind: Kind,

        #[command(flatten)]
        source: Source,
    },
    /// List the built-in programs
    List {
        /// Also print each program's JSON literal
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Evaluator,
    Machine,
}

/// Where a device comes from. Exactly one option is required.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// A JSON literal file
    #[arg(short, long)]
    program: Option<PathBuf>,

    /// A built-in program name
    #[arg(short, long)]
    builtin: Option<String>,

    /// A canonical bitstring
    #[arg(long)]
    bits: Option<String>,

    /// A canonical bitstring read as an integer
    #[arg(short, long)]
    integer: Option<u128>,
}

impl Source {
    fn evaluator(&self) -> Result<Evaluator, TuringError> {
        debug!("resolving evaluator from {}", self.describe());
        if let Some(path) = &self.program {
            ProgramLoader::load_evaluator(path)
        } else if let Some(name) = &self.builtin {
            CATALOG.evaluator(name).cloned()
        } else if let Some(bits) = &self.bits {
            Evaluator::import_from_binary(bits)
        } else if let Some(value) = self.integer {
            Evaluator::import_from_integer(value)
        } else {
            Err(TuringError::ValidationError("No program source given".to_string()))
        }
    }

    fn machine(&self) -> Result<Machine, TuringError> {
        debug!("resolving machine from {}", self.describe());
        if let Some(path) = &self.program {
            ProgramLoader::load_machine(path)
        } else if let Some(name) = &self.builtin {
            CATALOG.machine(name).cloned()
        } else if let Some(bits) = &self.bits {
            Machine::import_from_binary(bits)
        } else if let Some(value) = self.integer {
            Machine::import_from_integer(value)
        } else {
            Err(TuringError::ValidationError("No program source given".to_string()))
        }
    }

    fn describe(&self) -> String {
        if let Some(path) = &self.program {
            format!("file {}", path.display())
        } else if let Some(name) = &self.builtin {
            format!("built-in program '{}'", name)
        } else if let Some(bits) = &self.bits {
            format!("a {}-bit string", bits.len())
        } else {
            "an integer".to_string()
        }
    }

    fn device(&self, kind: Kind) -> Result<Device, TuringError> {
        Ok(match kind {
            Kind::Evaluator => Device::Evaluator(self.evaluator()?),
            Kind::Machine => Device::Machine(self.machine()?),
        })
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match execute(Cli::parse().command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> Result<(), TuringError> {
    match command {
        Command::Eval { source, values } => {
            let evaluator = source.evaluator()?;
            for value in values {
                println!("{}: {}", value, evaluator.process(value)?);
            }
        }
        Command::Run {
            source,
            tape,
            trace,
        } => {
            let machine = source.machine()?;
            let execution = machine.process(&tape, trace)?;

            if trace {
                export_state_transitions(&execution.trace, |state, line| {
                    println!("{} :: {}", state, line);
                });
                println!("\nFinal tape:");
            }
            println!("{}", execution.tape);
        }
        Command::Encode {
            kind,
            source,
            as_integer,
        } => match (source.device(kind)?, as_integer) {
            (Device::Evaluator(evaluator), true) => println!("{}", evaluator.export_as_integer()?),
            (Device::Machine(machine), true) => println!("{}", machine.export_as_integer()?),
            (device, false) => println!("{}", device.export_as_binary()?),
        },
        Command::Decode { kind, source } => {
            let literal = match source.device(kind)? {
                Device::Evaluator(evaluator) => serde_json::to_string_pretty(evaluator.graph())?,
                Device::Machine(machine) => serde_json::to_string_pretty(machine.program())?,
            };
            println!("{}", literal);
        }
        Command::List { verbose } => {
            for entry in CATALOG.iter() {
                let kind = match entry.device {
                    Device::Evaluator(_) => "evaluator",
                    Device::Machine(_) => "machine",
                };
                println!("{:<16} {}", entry.name, kind);
                if verbose {
                    println!("{}", entry.text.trim_end());
                }
            }
        }
    }

    Ok(())
}
