// FILE: src/cli/mod.rs

mod config;
mod handlers;

pub use config::ConfigFile;

use crate::error::{CompilerError, Result};
use crate::types::{Mode, Namespace, StyleUnit};
use crate::{default_component_class, CompilerOptions};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueEnum};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildMode {
    Dev,
    Prod,
}

impl From<BuildMode> for Mode {
    fn from(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Dev => Mode::Dev,
            BuildMode::Prod => Mode::Prod,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct EnhancedCli {
    config: ConfigFile,
    start_time: Instant,
}

impl Default for EnhancedCli {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedCli {
    pub fn new() -> Self {
        Self {
            config: ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"))?;

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        match matches.subcommand() {
            Some(("compile", sub_matches)) => handlers::handle_compile_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    fn unit_args() -> Vec<Arg> {
        vec![
            Arg::new("namespace")
                .short('n')
                .long("namespace")
                .value_name("NAME")
                .help("Namespace owning the stylesheet"),
            Arg::new("allow")
                .short('a')
                .long("allow")
                .value_name("COND")
                .help("Allow a conditional value (can be used multiple times)")
                .action(ArgAction::Append),
            Arg::new("validate-namespace")
                .long("validate-namespace")
                .help("Reject selectors that are not scoped to the component class")
                .action(ArgAction::SetTrue),
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_parser(clap::value_parser!(BuildMode))
                .help("Output mode [default: dev]"),
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Log every compilation phase")
                .action(ArgAction::SetTrue),
        ]
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("Kryon Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.toml or .json)")
                    .global(true)
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .global(true)
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("compile")
                    .about("Compile a stylesheet into text and structural nodes")
                    .arg(Arg::new("input").help("Input CSS file").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Write the result to FILE instead of stdout"))
                    .arg(Arg::new("class").long("class").value_name("CLASS").help("Component class [default: <namespace><FileStem>]"))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("text").help("Output format"))
                    .arg(Arg::new("stats").long("stats").help("Show compilation statistics").action(ArgAction::SetTrue))
                    .args(Self::unit_args()),
            )
            .subcommand(
                Command::new("check")
                    .about("Check stylesheets for issues without writing output")
                    .arg(Arg::new("input").help("Input CSS file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all CSS files in directory recursively").action(ArgAction::SetTrue))
                    .args(Self::unit_args()),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    pub fn build_compiler_options(&self, matches: &ArgMatches) -> Result<CompilerOptions> {
        let mut options = CompilerOptions::default();
        options.debug_mode = matches.get_flag("debug");
        if let Some(mode) = matches.get_one::<BuildMode>("mode") {
            options.mode = (*mode).into();
        } else if let Some(mode) = self.config.mode {
            options.mode = mode;
        }
        if let Some(resource_root) = &self.config.resource_root {
            options.resource_root = resource_root.clone();
        }
        Ok(options)
    }

    pub fn build_namespace(&self, matches: &ArgMatches) -> Result<Namespace> {
        let name = matches
            .get_one::<String>("namespace")
            .or(self.config.namespace.as_ref())
            .ok_or_else(|| CompilerError::InvalidFormat {
                message: "No namespace given. Use --namespace or set 'namespace' in the config file"
                    .to_string(),
            })?;

        let mut namespace = Namespace::new(name.as_str());
        if let Some(constants) = &self.config.constants {
            namespace.constants.extend(constants.clone());
        }
        Ok(namespace)
    }

    /// Unit for `input_path`, with source read from disk
    pub fn build_unit(&self, input_path: &str, matches: &ArgMatches) -> Result<StyleUnit> {
        let namespace = self.build_namespace(matches)?;
        let class = match matches.try_get_one::<String>("class").ok().flatten() {
            Some(class) => class.clone(),
            None => default_component_class(&namespace.name, input_path),
        };

        let mut unit = crate::load_unit(input_path, namespace)?;
        unit.component_class = class;

        let validate = matches.get_flag("validate-namespace")
            || self.config.validate_namespace.unwrap_or(false);
        let mut unit = unit.with_validate_namespace(validate);

        if let Some(conditions) = &self.config.allowed_conditions {
            unit = unit.allow_conditions(conditions);
        }
        if let Some(conditions) = matches.get_many::<String>("allow") {
            unit = unit.allow_conditions(conditions);
        }
        Ok(unit)
    }
}
