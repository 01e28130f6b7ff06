//! Parsed representation of SQL DDL.

use crate::dialect::Dialect;
use crate::parser::ParseError;

/// A parsed CREATE TABLE definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// Primary key column names, in declaration order.
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
    pub constraints: Vec<TableConstraint>,
}

impl Table {
    pub fn new(name: String) -> Self {
        Self {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }
}

/// A parsed column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Upper-cased SQL type name, including multi-word qualifiers
    /// (e.g. "TIMESTAMP WITH TIME ZONE").
    pub ty: String,
    /// Length for single-argument types (VARCHAR(255)).
    pub length: Option<u32>,
    /// Precision/scale for two-argument types (DECIMAL(10,2)).
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<DefaultExpr>,
    /// Set for SERIAL-family types.
    pub auto_increment: bool,
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: String, ty: String) -> Self {
        Self {
            name,
            ty,
            length: None,
            precision: None,
            scale: None,
            not_null: false,
            unique: false,
            default: None,
            auto_increment: false,
            comment: None,
        }
    }
}

/// A parsed DEFAULT expression, classified at parse time so the generator
/// can pattern match instead of re-scanning raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultExpr {
    /// Quoted string literal, quotes stripped.
    Str(String),
    /// Numeric literal, kept as written.
    Num(String),
    Bool(bool),
    Null,
    /// Function-style expression: a call or a bare SQL keyword acting as one
    /// ("NOW()", "CURRENT_TIMESTAMP", "uuid_generate_v4()").
    Call(String),
    /// Anything else, as raw text.
    Raw(String),
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// Constraint name, when declared via CONSTRAINT <name>.
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// An index definition, collected from CREATE INDEX statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// A table constraint other than PRIMARY KEY / FOREIGN KEY.
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    Check {
        name: Option<String>,
        expression: String,
    },
}

/// Result of parsing one DDL input.
#[derive(Debug)]
pub struct ParseResult {
    /// Tables in declaration order.
    pub tables: Vec<Table>,
    pub dialect: Dialect,
    /// Non-fatal diagnostics collected under lenient parsing.
    pub diagnostics: Vec<ParseError>,
}

/// Parsing policy.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Abort on the first structural or clause parse error.
    pub strict_mode: bool,
    /// Skip unsupported constructs with a diagnostic instead of failing.
    pub ignore_unsupported: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            ignore_unsupported: true,
        }
    }
}
