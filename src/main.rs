use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};
use slagen::template::{Migration, migrate_file};
use slagen::types::settings::parse_delimiter;
use slagen::{CliError, Generator, GeneratorOptions, Inventory, JobOverrides, OutputFormat, run_batch};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Generate Scribus documents from a template and a data file")]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate documents from one or more templates
    Generate(GenerateArgs),
    /// Rewrite legacy template syntax in place, keeping a .bak copy
    Migrate {
        #[arg(value_enum)]
        kind: MigrationKind,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the placeholders referenced by templates
    Vars {
        /// Print JSON instead of CSV lines
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        templates: Vec<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Templates to generate from
    #[arg(required = true)]
    templates: Vec<PathBuf>,

    /// Data file (default: the template path with a .csv extension)
    #[arg(short = 'c', long)]
    data_file: Option<PathBuf>,

    /// Field delimiter of the data file; `\t` for tab
    #[arg(short, long, value_parser = delimiter)]
    delimiter: Option<char>,

    /// Text encoding of the data file
    #[arg(short, long)]
    encoding: Option<String>,

    /// Output name pattern, may hold placeholders and %VAR_COUNT%
    #[arg(short = 'n', long)]
    out_name: Option<String>,

    /// Output directory (default: next to the template)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Merge everything into a single document
    #[arg(short, long)]
    single: bool,

    /// First data row to use, 1-based
    #[arg(short, long)]
    from: Option<String>,

    /// Last data row to use, 1-based
    #[arg(short, long)]
    to: Option<String>,

    /// Export PDFs (needs a host application)
    #[arg(long)]
    pdf: bool,

    /// Keep generated .sla files after PDF export
    #[arg(long)]
    keep_sla: bool,

    /// Store these settings in each template
    #[arg(long)]
    save_settings: bool,

    /// Start from the settings stored in each template
    #[arg(long)]
    load_settings: bool,

    /// Keep placeholders that have no value
    #[arg(long)]
    no_clean: bool,

    /// Keep the separators before removed placeholders
    #[arg(long)]
    keep_prefix: bool,

    /// Turn tabs and line breaks in values into spaces
    #[arg(long)]
    flatten_tabs: bool,

    /// Write documents without indentation
    #[arg(long)]
    compact: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MigrationKind {
    /// %VAR_NEXT-RECORD% to %SG_NEXT-RECORD%
    NextRecord,
    /// Old attribute carrier syntax
    Attributes,
}

impl From<MigrationKind> for Migration {
    fn from(kind: MigrationKind) -> Self {
        match kind {
            MigrationKind::NextRecord => Migration::NextRecord,
            MigrationKind::Attributes => Migration::Attributes,
        }
    }
}

fn delimiter(value: &str) -> Result<char, String> {
    parse_delimiter(value).ok_or_else(|| format!("'{}' is not a single character", value))
}

impl GenerateArgs {
    fn options(&self) -> GeneratorOptions {
        let mut options = GeneratorOptions::default();
        options.substitution.clean_unused = !self.no_clean;
        options.substitution.remove_cleaned_prefix = !self.keep_prefix;
        options.substitution.keep_tabs_and_linebreaks = !self.flatten_tabs;
        options.cleanup.enabled = !self.no_clean;
        options.indent_output = !self.compact;
        options
    }

    fn overrides(&self) -> JobOverrides {
        JobOverrides {
            data_file: self.data_file.clone(),
            output_dir: self.out_dir.clone(),
            output_name: self.out_name.clone(),
            delimiter: self.delimiter,
            encoding: self.encoding.clone(),
            single_output: self.single.then_some(true),
            first_row: self.from.clone(),
            last_row: self.to.clone(),
            format: self.pdf.then_some(OutputFormat::Pdf),
            keep_intermediate: self.keep_sla.then_some(true),
            save_settings: self.save_settings,
        }
    }
}

fn generate(args: &GenerateArgs) -> Result<(), CliError> {
    let mut generator = Generator::new(args.options()).with_multiple_templates(args.templates.len() > 1);
    let summary = run_batch(&mut generator, &args.templates, &args.overrides(), args.load_settings);
    match summary.failed() {
        0 => Ok(()),
        failed => Err(CliError::BatchFailed {
            failed,
            total: args.templates.len(),
        }),
    }
}

fn migrate(kind: MigrationKind, files: &[PathBuf]) -> Result<(), CliError> {
    for file in files {
        let report = migrate_file(file, kind.into())?;
        println!(
            "{}: {} line(s) changed, backup at {}",
            file.display(),
            report.changed_lines,
            report.backup.display()
        );
    }
    Ok(())
}

fn vars(templates: &[PathBuf], json: bool) -> Result<(), CliError> {
    let marker = GeneratorOptions::default().substitution.next_record_marker;
    let mut inventories = Vec::with_capacity(templates.len());
    for template in templates {
        let inventory = Inventory::load(template, &marker)?;
        info!(
            "{} consumes {} record(s) per output unit",
            template.display(),
            inventory.records_per_unit
        );
        inventories.push(inventory);
    }

    if json {
        let values: Vec<_> = inventories.iter().map(Inventory::to_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        println!("template,variable,kind");
        for line in inventories.iter().flat_map(Inventory::csv_lines) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let result = match &cli.command {
        Command::Generate(args) => generate(args),
        Command::Migrate { kind, files } => migrate(*kind, files),
        Command::Vars { json, templates } => vars(templates, *json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
