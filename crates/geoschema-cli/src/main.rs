//! Command-line interface for `GeoSchema`: inspect, compare and export the
//! schemas of tables and feature classes.
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for
//! structured logging. It parses arguments, configures logging and the
//! workspace, and delegates to the [`geoschema_core`] operations through a
//! [`FileStore`].
//!
//! # Available Commands
//!
//! - `describe` - Show a dataset's kind, driver and fields
//! - `fields` - List fields as a table, aligned text, separated text or names
//! - `max-length` - Longest value in one field
//! - `values` - Distinct values of one field
//! - `compare` - Compare the fields of two datasets
//! - `export` - Write a CSV schema report
//! - `import` - Create a dataset from a CSV schema report
//! - `drivers` - List all available format drivers and their capabilities

mod display;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geoschema_core::compare::{CompareOptions, SchemaComparison, compare_schemas};
use geoschema_core::drivers::get_available_drivers;
use geoschema_core::fields::{Charset, get_field_value_set, get_max_field_value_length};
use geoschema_core::report::{ReportOptions, export_schema_to_csv, import_schema_to_table};
use geoschema_core::schema::{
    FieldSelection, get_field_info_as_text, list_field_names, pprint_fields,
};
use geoschema_core::store::FileStore;
use geoschema_core_common::{DataStore, GeoSchemaError, Workspace};
use geoschema_csv::CsvOptions;

#[derive(Parser)]
#[command(
    name = "geoschema",
    version,
    about = "Schema inspection and reporting for tables and feature classes",
    long_about = "GeoSchema lists, compares and exports the field definitions of\n\
                  tabular and spatial datasets stored as CSV or GeoJSON files."
)]
/// Command-line arguments and options for the `GeoSchema` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    /// Directory that relative dataset references resolve against.
    #[arg(long, global = true, env = "GEOSCHEMA_WORKSPACE", value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Field delimiter for CSV datasets.
    #[arg(long, global = true, value_name = "CHAR")]
    delimiter: Option<char>,

    /// WKT geometry column that turns a CSV dataset into a feature class.
    #[arg(long, global = true, value_name = "COLUMN")]
    geometry_column: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shows a dataset's kind, driver and field table.
    Describe {
        #[arg(value_name = "DATASET")]
        dataset: String,
    },

    /// Lists the fields of a dataset.
    Fields {
        #[arg(value_name = "DATASET")]
        dataset: String,

        /// Which fields to list (table and names formats).
        #[arg(long, value_enum, default_value_t = SelectArg::All)]
        select: SelectArg,

        /// Output format.
        #[arg(long, value_enum, default_value_t = FieldsFormat::Table)]
        format: FieldsFormat,

        /// Separator for the text format.
        #[arg(long, default_value = ",")]
        sep: String,
    },

    /// Prints the length of the longest value in a field.
    MaxLength {
        #[arg(value_name = "DATASET")]
        dataset: String,
        #[arg(value_name = "FIELD")]
        field: String,
    },

    /// Prints the distinct values of a field, one per line.
    Values {
        #[arg(value_name = "DATASET")]
        dataset: String,
        #[arg(value_name = "FIELD")]
        field: String,

        /// Character set for text values: ascii, utf-8, utf8 or unicode.
        #[arg(long, default_value = "ascii")]
        charset: String,
    },

    /// Compares field types and lengths of two datasets.
    Compare {
        #[arg(value_name = "LEFT")]
        left: String,
        #[arg(value_name = "RIGHT")]
        right: String,

        /// Match field names regardless of case.
        #[arg(long)]
        ignore_case: bool,

        /// Also print fields that match.
        #[arg(long)]
        all: bool,
    },

    /// Writes a CSV schema report of a dataset.
    Export {
        #[arg(value_name = "DATASET")]
        dataset: String,

        /// Directory for the report; defaults to the dataset's directory.
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Creates a dataset from a CSV schema report.
    Import {
        #[arg(value_name = "CSV")]
        csv: PathBuf,
        #[arg(value_name = "TARGET")]
        target: String,
    },

    /// Lists all available drivers and their capabilities.
    Drivers,
}

#[derive(Clone, Copy, ValueEnum)]
enum SelectArg {
    All,
    Required,
    NonRequired,
}

impl From<SelectArg> for FieldSelection {
    fn from(arg: SelectArg) -> Self {
        match arg {
            SelectArg::All => FieldSelection::All,
            SelectArg::Required => FieldSelection::RequiredOnly,
            SelectArg::NonRequired => FieldSelection::NonRequiredOnly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldsFormat {
    /// Bordered table
    Table,
    /// Right-aligned columns
    Aligned,
    /// Separated values
    Text,
    /// Field names only
    Names,
}

/// Entry point for the `GeoSchema` command-line interface.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.debug, cli.verbose) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        },
    }
}

fn init_logging(debug: bool, verbose: bool) -> Result<()> {
    let log_level = if debug {
        Level::DEBUG
    } else if verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<GeoSchemaError>() {
        Some(err) => {
            eprintln!("Error: {}", err.user_message());
            if let Some(hint) = err.recovery_suggestion() {
                eprintln!("Hint: {hint}");
            }
        },
        None => eprintln!("Error: {err:#}"),
    }
}

fn build_store(cli: &Cli) -> Result<FileStore> {
    let workspace = Workspace::global();
    if let Some(dir) = &cli.workspace {
        debug!("Workspace: {}", dir.display());
        workspace.set(Some(dir.clone()));
    }

    let mut csv_options = CsvOptions::default();
    if let Some(delimiter) = cli.delimiter {
        csv_options = csv_options.with_delimiter_char(delimiter)?;
    }
    if let Some(column) = &cli.geometry_column {
        csv_options = csv_options.with_geometry_column(column);
    }

    Ok(FileStore::new(workspace).with_csv_options(csv_options))
}

fn run(cli: Cli) -> Result<()> {
    let mut store = build_store(&cli)?;

    match cli.command {
        Commands::Describe { dataset } => handle_describe(&store, &dataset),
        Commands::Fields {
            dataset,
            select,
            format,
            sep,
        } => handle_fields(&store, &dataset, select.into(), format, &sep),
        Commands::MaxLength { dataset, field } => {
            let length = get_max_field_value_length(&store, &dataset, &field)?;
            println!("{length}");
            Ok(())
        },
        Commands::Values {
            dataset,
            field,
            charset,
        } => {
            let charset: Charset = charset.parse()?;
            for value in get_field_value_set(&store, &dataset, &field, charset)? {
                println!("{value}");
            }
            Ok(())
        },
        Commands::Compare {
            left,
            right,
            ignore_case,
            all,
        } => handle_compare(&store, &left, &right, ignore_case, all),
        Commands::Export {
            dataset,
            output_dir,
        } => {
            let mut options = ReportOptions::new();
            if let Some(dir) = output_dir {
                options = options.with_output_dir(dir);
            }
            let workspace = store.workspace().clone();
            let path = export_schema_to_csv(&store, &workspace, &dataset, &options)?;
            println!("{}", path.display());
            Ok(())
        },
        Commands::Import { csv, target } => {
            info!("Importing {} into {target}", csv.display());
            let description = import_schema_to_table(&mut store, &csv, &target)?;
            println!(
                "Created {} {}",
                description.kind,
                description.catalog_path.display()
            );
            Ok(())
        },
        Commands::Drivers => {
            display::display_drivers(&get_available_drivers());
            Ok(())
        },
    }
}

fn handle_describe(store: &dyn DataStore, dataset: &str) -> Result<()> {
    info!("Describing {dataset}");
    let description = store.describe(dataset)?;
    let fields = store.list_fields(dataset)?;
    display::display_description(&description, &fields);
    Ok(())
}

fn handle_fields(
    store: &dyn DataStore,
    dataset: &str,
    selection: FieldSelection,
    format: FieldsFormat,
    sep: &str,
) -> Result<()> {
    match format {
        FieldsFormat::Table => {
            let fields: Vec<_> = store
                .list_fields(dataset)?
                .into_iter()
                .filter(|field| selection.includes(field))
                .collect();
            println!("{}", display::fields_table(&fields));
        },
        FieldsFormat::Aligned => print!("{}", pprint_fields(store, dataset)?),
        FieldsFormat::Text => print!("{}", get_field_info_as_text(store, dataset, sep)?),
        FieldsFormat::Names => {
            for name in list_field_names(store, dataset, selection)? {
                println!("{name}");
            }
        },
    }
    Ok(())
}

fn handle_compare(
    store: &dyn DataStore,
    left: &str,
    right: &str,
    ignore_case: bool,
    all: bool,
) -> Result<()> {
    let options = CompareOptions::new().with_case_insensitive(ignore_case);
    let comparison = compare_schemas(store, left, right, &options)?;
    for line in comparison_lines(&comparison, all) {
        println!("{line}");
    }
    Ok(())
}

/// Lines printed by `compare`: the differences, or every entry with `--all`.
fn comparison_lines(comparison: &SchemaComparison, all: bool) -> Vec<String> {
    if comparison.is_identical() && !all {
        return vec![format!(
            "No differences between {} and {}",
            comparison.left, comparison.right
        )];
    }
    comparison
        .entries
        .iter()
        .filter(|entry| all || entry.is_difference())
        .map(|entry| entry.message().trim_start().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use geoschema_core::store::{MemoryStore, MemoryTable};
    use geoschema_core_common::{DatasetKind, FieldDescriptor, FieldType};

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_table(
                "old",
                MemoryTable::new(
                    DatasetKind::Table,
                    vec![FieldDescriptor::new("NAME", FieldType::String).with_length(50)],
                ),
            )
            .with_table(
                "new",
                MemoryTable::new(
                    DatasetKind::Table,
                    vec![FieldDescriptor::new("name", FieldType::String).with_length(50)],
                ),
            )
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_select_arg_maps_to_selection() {
        assert_eq!(
            FieldSelection::from(SelectArg::NonRequired),
            FieldSelection::NonRequiredOnly
        );
        assert_eq!(
            FieldSelection::from(SelectArg::Required),
            FieldSelection::RequiredOnly
        );
    }

    #[test]
    fn test_comparison_lines_fold_case_when_asked() -> Result<()> {
        let store = store();

        let exact = compare_schemas(&store, "old", "new", &CompareOptions::new())?;
        assert_eq!(
            comparison_lines(&exact, false),
            vec!["NAME not found in new", "name not found in old"]
        );

        let folded = compare_schemas(
            &store,
            "old",
            "new",
            &CompareOptions::new().with_case_insensitive(true),
        )?;
        assert_eq!(
            comparison_lines(&folded, false),
            vec!["No differences between old and new"]
        );
        assert_eq!(
            comparison_lines(&folded, true),
            vec!["NAME field same in both"]
        );
        Ok(())
    }

    #[test]
    fn test_handle_fields_rejects_empty_separator() {
        let store = store();
        let err = handle_fields(&store, "old", FieldSelection::All, FieldsFormat::Text, "")
            .unwrap_err();
        assert!(err.downcast_ref::<GeoSchemaError>().is_some());
    }

    #[test]
    fn test_handle_describe_missing_dataset() {
        let store = store();
        assert!(handle_describe(&store, "absent").is_err());
    }
}
