//! Drizzle schema emission.

use crate::ast::Table;
use crate::deps::{CycleError, sort_by_dependencies};
use crate::dialect::Dialect;
use crate::types::{MapTypeError, map_column};
use heck::{AsLowerCamelCase, AsUpperCamelCase};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0} schema generation is not yet implemented")]
    UnsupportedDialect(Dialect),
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error("table {table}: {source}")]
    Column {
        table: String,
        source: MapTypeError,
    },
}

/// Naming convention applied to emitted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingCase {
    /// userProfiles
    #[default]
    Camel,
    /// UserProfiles
    Pascal,
    /// user_profiles, unchanged
    Snake,
    /// user-profiles
    Kebab,
}

impl NamingCase {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "camel" => Some(Self::Camel),
            "pascal" => Some(Self::Pascal),
            "snake" => Some(Self::Snake),
            "kebab" => Some(Self::Kebab),
            _ => None,
        }
    }
}

/// Convert an identifier to the given naming case.
pub fn convert_case(input: &str, case: NamingCase) -> String {
    match case {
        NamingCase::Camel => AsLowerCamelCase(input).to_string(),
        NamingCase::Pascal => AsUpperCamelCase(input).to_string(),
        NamingCase::Snake => input.to_string(),
        NamingCase::Kebab => input.replace('_', "-"),
    }
}

/// Schema generation configuration.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub table_name_case: NamingCase,
    pub column_name_case: NamingCase,
    pub include_comments: bool,
    /// Prefix for exported constants, also applied to reference targets.
    pub export_prefix: String,
    pub indent_size: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            table_name_case: NamingCase::Camel,
            column_name_case: NamingCase::Camel,
            include_comments: true,
            export_prefix: String::new(),
            indent_size: 2,
        }
    }
}

/// Generate a complete Drizzle schema module from parsed tables.
///
/// Tables are emitted in dependency order; the import line lists every
/// constructor in use, alphabetically.
pub fn generate_schema(
    tables: &[Table],
    dialect: Dialect,
    options: &GeneratorOptions,
) -> Result<String, GenerateError> {
    if dialect != Dialect::Postgres {
        return Err(GenerateError::UnsupportedDialect(dialect));
    }

    let mut imports: BTreeSet<&'static str> = BTreeSet::new();
    imports.insert("pgTable");
    for table in tables {
        for column in &table.columns {
            let mapped = map_column(column).map_err(|source| GenerateError::Column {
                table: table.name.clone(),
                source,
            })?;
            imports.insert(mapped.function);
        }
    }

    let sorted = sort_by_dependencies(tables)?;

    let mut output = String::new();
    let import_list: Vec<&str> = imports.into_iter().collect();
    output.push_str(&format!(
        "import {{ {} }} from 'drizzle-orm/pg-core';\n\n",
        import_list.join(", ")
    ));

    for (i, table) in sorted.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        generate_table(table, options, &mut output)?;
    }

    Ok(output)
}

fn generate_table(
    table: &Table,
    options: &GeneratorOptions,
    output: &mut String,
) -> Result<(), GenerateError> {
    let export_name = convert_case(&table.name, options.table_name_case);
    let indent = " ".repeat(options.indent_size);

    if options.include_comments {
        output.push_str(&format!("// {} table\n", table.name));
    }

    output.push_str(&format!(
        "export const {}{} = pgTable('{}', {{\n",
        options.export_prefix, export_name, table.name
    ));

    for (i, column) in table.columns.iter().enumerate() {
        let mapped = map_column(column).map_err(|source| GenerateError::Column {
            table: table.name.clone(),
            source,
        })?;

        let column_name = convert_case(&column.name, options.column_name_case);
        output.push_str(&format!(
            "{}{}: {}({})",
            indent,
            column_name,
            mapped.function,
            mapped.args.join(", ")
        ));

        for modifier in &mapped.chain {
            output.push('.');
            output.push_str(modifier);
        }

        if table.primary_key.iter().any(|pk| pk == &column.name) {
            output.push_str(".primaryKey()");
        }

        // Only single-column foreign keys can be rendered as a reference.
        if let Some(fk) = table.foreign_keys.iter().find(|fk| {
            fk.columns.len() == 1
                && fk.columns[0] == column.name
                && fk.referenced_columns.len() == 1
        }) {
            let target_table = convert_case(&fk.referenced_table, options.table_name_case);
            let target_column = convert_case(&fk.referenced_columns[0], options.column_name_case);
            output.push_str(&format!(
                ".references(() => {}{}.{})",
                options.export_prefix, target_table, target_column
            ));
        }

        if i < table.columns.len() - 1 {
            output.push(',');
        }
        if options.include_comments {
            if let Some(comment) = &column.comment {
                output.push_str(&format!(" // {}", comment));
            }
        }
        output.push('\n');
    }

    output.push_str("});\n");
    Ok(())
}
