use crate::{
    cli::Commands,
    error::{Error, Result},
    ioutils::read_arg_or_stdin,
    provider::{HostFunction, Provider, TEMPLATE_ARGUMENT},
    renderer::{Engine, LogObserver},
};
use log::{debug, info};
use std::io::{self, Write};

/// Runs one CLI command.
pub struct Runner {
    command: Commands,
    provider: Provider,
}

impl Runner {
    pub fn new(command: Commands) -> Self {
        let engine = Engine::new().with_observer(LogObserver);
        Self { command, provider: Provider::new(engine) }
    }

    /// Executes the command, writing rendered output to `out`.
    pub fn run_to<W: Write + ?Sized>(self, out: &mut W) -> Result<()> {
        match &self.command {
            Commands::Execute(args) => {
                let data = Self::load_data(args.data.as_deref())?;
                let output = self.provider.call(HostFunction::Execute, &args.text, data)?;
                Self::emit(out, &output)
            }
            Commands::ExecuteFile(args) => {
                let data = Self::load_data(args.data.as_deref())?;
                let output = self.provider.execute_file(&args.path, data)?;
                Self::emit(out, &output)
            }
            Commands::Validate(args) => {
                let function = if args.file {
                    HostFunction::ExecuteFile
                } else {
                    HostFunction::Execute
                };
                self.provider.validate_argument(function, TEMPLATE_ARGUMENT, &args.template)?;
                info!("Template is valid.");
                writeln!(out, "Template is valid.").map_err(Error::Sink)
            }
        }
    }

    /// Reads the `--data` argument; absent data is null.
    fn load_data(arg: Option<&str>) -> Result<String> {
        match arg {
            Some(arg) => read_arg_or_stdin(arg),
            None => {
                debug!("No data given, using null");
                Ok("null".to_string())
            }
        }
    }

    fn emit<W: Write + ?Sized>(out: &mut W, output: &str) -> Result<()> {
        out.write_all(output.as_bytes()).map_err(Error::Sink)?;
        out.flush().map_err(Error::Sink)
    }
}

/// Runs a command, printing the result to stdout.
pub fn run(command: Commands) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    Runner::new(command).run_to(&mut out)
}
