use anyhow::{Context, Result};
use clap::Parser;
use drizzlegen::ast::ParseOptions;
use drizzlegen::dialect::Dialect;
use drizzlegen::generator::{GeneratorOptions, NamingCase, generate_schema};
use drizzlegen::parser::parse_sql;
use std::fs;
use std::path::{Path, PathBuf};

/// Convert SQL schemas to Drizzle ORM schema definitions
#[derive(Parser)]
#[command(name = "drizzlegen", version)]
#[command(about = "Convert SQL DDL files to Drizzle ORM schema definitions")]
struct Cli {
    /// SQL file to convert
    sql_file: PathBuf,

    /// Output TypeScript file
    #[arg(short, long, default_value = "schema.ts")]
    output: PathBuf,

    /// Database dialect (postgresql, mysql, spanner)
    #[arg(short, long, default_value = "postgresql")]
    dialect: String,

    /// Naming convention for exported table constants (camel, pascal, snake, kebab)
    #[arg(long, default_value = "camel")]
    table_case: String,

    /// Naming convention for column properties (camel, pascal, snake, kebab)
    #[arg(long, default_value = "camel")]
    column_case: String,

    /// Do not emit descriptive comments
    #[arg(long)]
    no_comments: bool,

    /// Prefix for exported constants
    #[arg(long, default_value = "")]
    prefix: String,

    /// Indentation width in spaces
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Abort on the first parse error instead of skipping
    #[arg(long)]
    strict: bool,

    /// Suppress stdout output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dialect = Dialect::from_str(&cli.dialect).with_context(|| {
        format!(
            "unsupported dialect '{}' (expected postgresql, mysql, or spanner)",
            cli.dialect
        )
    })?;
    let table_case = NamingCase::from_str(&cli.table_case)
        .with_context(|| format!("unsupported table case '{}'", cli.table_case))?;
    let column_case = NamingCase::from_str(&cli.column_case)
        .with_context(|| format!("unsupported column case '{}'", cli.column_case))?;

    if !cli.quiet {
        println!("Converting SQL file: {}", cli.sql_file.display());
        println!("Output file: {}", cli.output.display());
        println!("Database dialect: {}", dialect);
    }

    let content = fs::read_to_string(&cli.sql_file)
        .with_context(|| format!("failed to read {}", cli.sql_file.display()))?;

    let parse_options = ParseOptions {
        strict_mode: cli.strict,
        ignore_unsupported: true,
    };
    let result = parse_sql(&content, dialect, parse_options)
        .with_context(|| format!("failed to parse {}", cli.sql_file.display()))?;

    if !cli.quiet {
        println!("Parsed {} table(s):", result.tables.len());
        for table in &result.tables {
            println!("  - {} ({} columns)", table.name, table.columns.len());
            if !table.primary_key.is_empty() {
                println!("    primary key: {}", table.primary_key.join(", "));
            }
            if !table.foreign_keys.is_empty() {
                println!("    foreign keys: {}", table.foreign_keys.len());
            }
        }
        if !result.diagnostics.is_empty() {
            println!("\nWarnings during parsing:");
            for diagnostic in &result.diagnostics {
                println!("  - {}", diagnostic);
            }
        }
    }

    let options = GeneratorOptions {
        table_name_case: table_case,
        column_name_case: column_case,
        include_comments: !cli.no_comments,
        export_prefix: cli.prefix,
        indent_size: cli.indent,
    };
    let schema = generate_schema(&result.tables, dialect, &options)?;

    write_atomic(&cli.output, &schema)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    if !cli.quiet {
        println!("Generated Drizzle schema: {}", cli.output.display());
    }

    Ok(())
}

/// Write through a sibling temporary file and rename, so a failure never
/// leaves a truncated destination behind.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}
