//! Recursive-descent parser for CREATE TABLE statements.

use crate::ast::{
    Column, DefaultExpr, ForeignKey, Index, ParseOptions, ParseResult, Table, TableConstraint,
};
use crate::dialect::Dialect;
use crate::lexer::{Lexer, Token};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0} dialect support is not yet implemented")]
    UnsupportedDialect(Dialect),
    #[error("could not extract table name, found {found:?}")]
    MissingTableName { found: Token },
    #[error("table {table}: missing parenthesized body")]
    MissingTableBody { table: String },
    #[error("table {table}: could not parse column definition near {found:?}")]
    InvalidColumn { table: String, found: Token },
    #[error("table {table}: FOREIGN KEY without REFERENCES clause")]
    MalformedForeignKey { table: String },
    #[error("table {table}: unsupported constraint near {found:?}")]
    UnsupportedConstraint { table: String, found: Token },
    #[error("{statement} references unknown table {table}")]
    UnknownTable { table: String, statement: &'static str },
    #[error("comment on {table}.{column}: no such column")]
    UnknownColumn { table: String, column: String },
}

/// Parse DDL content for the given dialect.
///
/// Under lenient options, recoverable errors are collected on the returned
/// [`ParseResult`]; under strict options the first error is returned.
pub fn parse_sql(
    content: &str,
    dialect: Dialect,
    options: ParseOptions,
) -> Result<ParseResult, ParseError> {
    match dialect {
        Dialect::Postgres => {
            let tokens = Lexer::new(content).tokenize();
            PostgresParser::new(tokens, options).parse()
        }
        other => Err(ParseError::UnsupportedDialect(other)),
    }
}

struct PostgresParser {
    tokens: Vec<Token>,
    pos: usize,
    options: ParseOptions,
}

impl PostgresParser {
    fn new(tokens: Vec<Token>, options: ParseOptions) -> Self {
        Self {
            tokens,
            pos: 0,
            options,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Fatal for structural and clause errors.
    fn strict(&self) -> bool {
        self.options.strict_mode
    }

    /// Fatal for unsupported-construct diagnostics.
    fn unsupported_fatal(&self) -> bool {
        self.options.strict_mode || !self.options.ignore_unsupported
    }

    /// Record a recoverable error as a diagnostic, or abort when fatal.
    fn recover(
        &self,
        diagnostics: &mut Vec<ParseError>,
        err: ParseError,
        fatal: bool,
    ) -> Result<(), ParseError> {
        if fatal {
            Err(err)
        } else {
            diagnostics.push(err);
            Ok(())
        }
    }

    fn parse(&mut self) -> Result<ParseResult, ParseError> {
        let mut tables: Vec<Table> = Vec::new();
        let mut diagnostics: Vec<ParseError> = Vec::new();
        // Constraints declared outside CREATE TABLE, attached once the
        // whole input has been read.
        let mut pending_fks: Vec<(String, ForeignKey)> = Vec::new();
        let mut pending_indexes: Vec<(String, Index)> = Vec::new();
        let mut pending_comments: Vec<(String, String, String)> = Vec::new();

        loop {
            if self.current().is_ident("COMMENT") {
                if let Some(entry) = self.parse_comment_on() {
                    pending_comments.push(entry);
                }
                continue;
            }
            match self.current() {
                Token::Eof => break,
                Token::Create => {
                    self.advance();
                    match self.current() {
                        Token::Table => {
                            self.advance();
                            self.skip_if_not_exists();
                            match self.parse_create_table(&mut diagnostics) {
                                Ok(table) => tables.push(table),
                                Err(e) => {
                                    self.recover(&mut diagnostics, e, self.strict())?;
                                    self.skip_statement();
                                }
                            }
                        }
                        Token::Unique | Token::Index => {
                            if let Some((table, index)) = self.parse_create_index() {
                                pending_indexes.push((table, index));
                            }
                        }
                        // CREATE VIEW, CREATE SEQUENCE, ...
                        _ => self.skip_statement(),
                    }
                }
                Token::Alter => {
                    if let Some((table, fk)) = self.parse_alter_table_fk(&mut diagnostics)? {
                        pending_fks.push((table, fk));
                    }
                }
                _ => self.skip_statement(),
            }
        }

        for (table_name, fk) in pending_fks {
            match tables.iter_mut().find(|t| t.name == table_name) {
                Some(table) => table.foreign_keys.push(fk),
                None => {
                    let err = ParseError::UnknownTable {
                        table: table_name,
                        statement: "ALTER TABLE",
                    };
                    self.recover(&mut diagnostics, err, self.unsupported_fatal())?;
                }
            }
        }

        for (table_name, index) in pending_indexes {
            match tables.iter_mut().find(|t| t.name == table_name) {
                Some(table) => table.indexes.push(index),
                None => {
                    let err = ParseError::UnknownTable {
                        table: table_name,
                        statement: "CREATE INDEX",
                    };
                    self.recover(&mut diagnostics, err, self.unsupported_fatal())?;
                }
            }
        }

        for (table_name, column_name, text) in pending_comments {
            let column = tables
                .iter_mut()
                .find(|t| t.name == table_name)
                .and_then(|t| t.columns.iter_mut().find(|c| c.name == column_name));
            match column {
                Some(column) => column.comment = Some(text),
                None => {
                    let err = ParseError::UnknownColumn {
                        table: table_name,
                        column: column_name,
                    };
                    self.recover(&mut diagnostics, err, self.unsupported_fatal())?;
                }
            }
        }

        Ok(ParseResult {
            tables,
            dialect: Dialect::Postgres,
            diagnostics,
        })
    }

    fn parse_create_table(
        &mut self,
        diagnostics: &mut Vec<ParseError>,
    ) -> Result<Table, ParseError> {
        let name = self.parse_qualified_name().ok_or(ParseError::MissingTableName {
            found: self.current().clone(),
        })?;

        if self.current() != &Token::LParen {
            return Err(ParseError::MissingTableBody { table: name });
        }
        self.advance();

        let mut table = Table::new(name);

        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                }
                // Unterminated body still yields the clauses seen so far.
                Token::Eof | Token::Semicolon => break,
                Token::Constraint | Token::Primary | Token::Foreign | Token::Unique
                | Token::Check => {
                    if let Err(e) = self.parse_table_constraint(&mut table) {
                        let fatal = match e {
                            ParseError::UnsupportedConstraint { .. } => self.unsupported_fatal(),
                            _ => self.strict(),
                        };
                        self.recover(diagnostics, e, fatal)?;
                        self.skip_clause();
                    }
                }
                // MySQL-style KEY/INDEX members inside the body.
                Token::Index | Token::Key => self.skip_clause(),
                Token::Ident(_) => match self.parse_column(&table.name) {
                    Ok((column, inline_pk, inline_fk)) => {
                        if inline_pk {
                            table.primary_key.push(column.name.clone());
                        }
                        if let Some(fk) = inline_fk {
                            table.foreign_keys.push(fk);
                        }
                        table.columns.push(column);
                    }
                    Err(e) => {
                        self.recover(diagnostics, e, self.strict())?;
                        self.skip_clause();
                    }
                },
                _ => {
                    let e = ParseError::InvalidColumn {
                        table: table.name.clone(),
                        found: self.current().clone(),
                    };
                    self.recover(diagnostics, e, self.strict())?;
                    self.skip_clause();
                }
            }
        }

        // Table options (WITH, TABLESPACE, ENGINE=, ...)
        self.skip_statement();

        Ok(table)
    }

    /// Parse one column clause. Also reports an inline PRIMARY KEY and an
    /// inline REFERENCES foreign key, which belong to the table.
    fn parse_column(
        &mut self,
        table_name: &str,
    ) -> Result<(Column, bool, Option<ForeignKey>), ParseError> {
        let name = match self.current().clone() {
            Token::Ident(n) => n,
            found => {
                return Err(ParseError::InvalidColumn {
                    table: table_name.to_string(),
                    found,
                });
            }
        };
        self.advance();

        let (ty, args) = self.parse_type(table_name)?;

        let mut column = Column::new(name, ty);
        match args.as_slice() {
            [] => {}
            [length] => column.length = Some(*length),
            [precision, scale, ..] => {
                column.precision = Some(*precision);
                column.scale = Some(*scale);
            }
        }
        column.auto_increment =
            matches!(column.ty.as_str(), "SERIAL" | "BIGSERIAL" | "SMALLSERIAL");

        let mut inline_pk = false;
        let mut inline_fk: Option<ForeignKey> = None;

        loop {
            match self.current() {
                Token::Comma | Token::RParen | Token::Semicolon | Token::Eof => break,
                Token::Not => {
                    self.advance();
                    if self.current() == &Token::Null {
                        self.advance();
                        column.not_null = true;
                    }
                }
                Token::Null => {
                    self.advance();
                }
                Token::Unique => {
                    self.advance();
                    if self.current() == &Token::Key {
                        self.advance();
                    }
                    column.unique = true;
                }
                Token::Primary => {
                    self.advance();
                    if self.current() == &Token::Key {
                        self.advance();
                    }
                    inline_pk = true;
                }
                Token::Default => {
                    self.advance();
                    column.default = self.parse_default_expr();
                }
                Token::References => {
                    self.advance();
                    let (target, target_column) = self.parse_reference(table_name)?;
                    inline_fk = Some(ForeignKey {
                        name: None,
                        columns: vec![column.name.clone()],
                        referenced_table: target,
                        referenced_columns: vec![target_column],
                        on_delete: None,
                        on_update: None,
                    });
                }
                Token::On => {
                    let (on_delete, on_update) = self.parse_on_actions();
                    if let Some(fk) = inline_fk.as_mut() {
                        fk.on_delete = on_delete.or(fk.on_delete.take());
                        fk.on_update = on_update.or(fk.on_update.take());
                    }
                }
                Token::Check => {
                    self.advance();
                    self.skip_parenthesized();
                }
                Token::Constraint => {
                    // Named inline constraint; the name is irrelevant here.
                    self.advance();
                    if matches!(self.current(), Token::Ident(_)) {
                        self.advance();
                    }
                }
                // COLLATE and other trailing noise.
                _ => self.advance(),
            }
        }

        Ok((column, inline_pk, inline_fk))
    }

    /// Parse a type token: base name, optional parenthesized numeric
    /// arguments, and multi-word qualifiers.
    fn parse_type(&mut self, table_name: &str) -> Result<(String, Vec<u32>), ParseError> {
        let mut ty = match self.current().clone() {
            Token::Ident(t) => t.to_uppercase(),
            found => {
                return Err(ParseError::InvalidColumn {
                    table: table_name.to_string(),
                    found,
                });
            }
        };
        self.advance();

        let mut args: Vec<u32> = Vec::new();

        loop {
            if self.current() == &Token::LParen {
                self.advance();
                let mut depth = 1;
                while depth > 0 {
                    match self.current().clone() {
                        Token::LParen => {
                            depth += 1;
                            self.advance();
                        }
                        Token::RParen => {
                            depth -= 1;
                            self.advance();
                        }
                        Token::Num(n) => {
                            if depth == 1 {
                                if let Ok(v) = n.parse::<u32>() {
                                    args.push(v);
                                }
                            }
                            self.advance();
                        }
                        Token::Eof => break,
                        _ => self.advance(),
                    }
                }
            } else if self.current().is_ident("VARYING")
                && matches!(ty.as_str(), "CHARACTER" | "CHAR" | "BIT")
            {
                ty.push_str(" VARYING");
                self.advance();
            } else if self.current().is_ident("PRECISION") && ty == "DOUBLE" {
                ty.push_str(" PRECISION");
                self.advance();
            } else if self.current().is_ident("WITH") || self.current().is_ident("WITHOUT") {
                let with = self.current().is_ident("WITH");
                let start = self.pos;
                self.advance();
                if self.current().is_ident("TIME") {
                    self.advance();
                    if self.current().is_ident("ZONE") {
                        self.advance();
                        ty.push_str(if with { " WITH TIME ZONE" } else { " WITHOUT TIME ZONE" });
                        continue;
                    }
                }
                // Not a TIME ZONE qualifier; leave it for the modifier tail.
                self.pos = start;
                break;
            } else {
                break;
            }
        }

        Ok((ty, args))
    }

    fn parse_default_expr(&mut self) -> Option<DefaultExpr> {
        const NOW_KEYWORDS: [&str; 5] = [
            "CURRENT_TIMESTAMP",
            "CURRENT_DATE",
            "CURRENT_TIME",
            "LOCALTIMESTAMP",
            "LOCALTIME",
        ];

        match self.current().clone() {
            Token::Str(s) => {
                self.advance();
                Some(DefaultExpr::Str(s))
            }
            Token::Num(n) => {
                self.advance();
                Some(DefaultExpr::Num(n))
            }
            Token::Null => {
                self.advance();
                Some(DefaultExpr::Null)
            }
            Token::Ident(s) => {
                self.advance();
                let upper = s.to_uppercase();
                match upper.as_str() {
                    "TRUE" => return Some(DefaultExpr::Bool(true)),
                    "FALSE" => return Some(DefaultExpr::Bool(false)),
                    _ => {}
                }
                if self.current() == &Token::LParen {
                    self.advance();
                    let inner = self.collect_until_paren();
                    Some(DefaultExpr::Call(format!("{}({})", s, inner)))
                } else if NOW_KEYWORDS.contains(&upper.as_str()) {
                    Some(DefaultExpr::Call(upper))
                } else {
                    Some(DefaultExpr::Raw(s))
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.collect_until_paren();
                Some(DefaultExpr::Raw(format!("({})", inner)))
            }
            _ => None,
        }
    }

    /// Collect raw text up to the matching closing parenthesis, which is
    /// consumed but not included.
    fn collect_until_paren(&mut self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut depth = 1;

        loop {
            match self.current().clone() {
                Token::LParen => {
                    depth += 1;
                    parts.push("(".to_string());
                    self.advance();
                }
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                    parts.push(")".to_string());
                    self.advance();
                }
                Token::Ident(s) => {
                    parts.push(s);
                    self.advance();
                }
                Token::Num(n) => {
                    parts.push(n);
                    self.advance();
                }
                Token::Str(s) => {
                    parts.push(format!("'{}'", s));
                    self.advance();
                }
                Token::Comma => {
                    parts.push(",".to_string());
                    self.advance();
                }
                Token::Op(op) => {
                    parts.push(op);
                    self.advance();
                }
                Token::Semicolon | Token::Eof => break,
                tok => {
                    if let Some(kw) = tok.keyword_text() {
                        parts.push(kw.to_string());
                    }
                    self.advance();
                }
            }
        }

        parts.join(" ")
    }

    fn parse_table_constraint(&mut self, table: &mut Table) -> Result<(), ParseError> {
        let name = if self.current() == &Token::Constraint {
            self.advance();
            match self.current().clone() {
                Token::Ident(n) => {
                    self.advance();
                    Some(n)
                }
                _ => None,
            }
        } else {
            None
        };

        match self.current() {
            Token::Primary => {
                self.advance();
                if self.current() == &Token::Key {
                    self.advance();
                }
                let columns = self.parse_column_list();
                table.primary_key.extend(columns);
                Ok(())
            }
            Token::Foreign => {
                let fk = self.parse_foreign_key(&table.name, name)?;
                table.foreign_keys.push(fk);
                Ok(())
            }
            Token::Unique => {
                self.advance();
                if self.current() == &Token::Key {
                    self.advance();
                }
                let columns = self.parse_column_list();
                table.constraints.push(TableConstraint::Unique { name, columns });
                Ok(())
            }
            Token::Check => {
                self.advance();
                let expression = if self.current() == &Token::LParen {
                    self.advance();
                    self.collect_until_paren()
                } else {
                    String::new()
                };
                table.constraints.push(TableConstraint::Check { name, expression });
                Ok(())
            }
            // EXCLUDE and friends.
            found => Err(ParseError::UnsupportedConstraint {
                table: table.name.clone(),
                found: found.clone(),
            }),
        }
    }

    fn parse_foreign_key(
        &mut self,
        table_name: &str,
        name: Option<String>,
    ) -> Result<ForeignKey, ParseError> {
        self.advance(); // FOREIGN
        if self.current() == &Token::Key {
            self.advance();
        }

        let columns = self.parse_column_list();

        if self.current() != &Token::References {
            return Err(ParseError::MalformedForeignKey {
                table: table_name.to_string(),
            });
        }
        self.advance();

        let (referenced_table, default_column) = self.parse_reference(table_name)?;
        let referenced_columns = if self.current() == &Token::LParen {
            // parse_reference stops before a multi-column list
            self.parse_column_list()
        } else {
            vec![default_column]
        };

        let (on_delete, on_update) = self.parse_on_actions();

        Ok(ForeignKey {
            name,
            columns,
            referenced_table,
            referenced_columns,
            on_delete,
            on_update,
        })
    }

    /// Parse `<table>[(<column>)]` after REFERENCES. A single referenced
    /// column is consumed here; a multi-column list is left for the caller.
    fn parse_reference(&mut self, table_name: &str) -> Result<(String, String), ParseError> {
        let target = self
            .parse_qualified_name()
            .ok_or(ParseError::MalformedForeignKey {
                table: table_name.to_string(),
            })?;

        let column = if self.current() == &Token::LParen
            && self.peek_single_column().is_some()
        {
            self.advance();
            let column = match self.current().clone() {
                Token::Ident(c) => c,
                _ => "id".to_string(),
            };
            self.advance();
            self.advance(); // closing paren
            column
        } else if self.current() == &Token::LParen {
            // leave the multi-column list in place
            return Ok((target, "id".to_string()));
        } else {
            "id".to_string()
        };

        Ok((target, column))
    }

    /// Look ahead past an LParen for exactly `Ident RParen`.
    fn peek_single_column(&self) -> Option<&str> {
        match (self.tokens.get(self.pos + 1), self.tokens.get(self.pos + 2)) {
            (Some(Token::Ident(c)), Some(Token::RParen)) => Some(c),
            _ => None,
        }
    }

    /// Parse `<ident>` or `<schema>.<ident>`, returning the final segment.
    fn parse_qualified_name(&mut self) -> Option<String> {
        let mut name = match self.current().clone() {
            Token::Ident(n) => n,
            _ => return None,
        };
        self.advance();

        while self.current() == &Token::Dot {
            self.advance();
            match self.current().clone() {
                Token::Ident(n) => {
                    name = n;
                    self.advance();
                }
                _ => break,
            }
        }

        Some(name)
    }

    fn parse_column_list(&mut self) -> Vec<String> {
        let mut columns = Vec::new();

        if self.current() != &Token::LParen {
            return columns;
        }
        self.advance();

        loop {
            match self.current().clone() {
                Token::Ident(name) => {
                    columns.push(name);
                    self.advance();
                }
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => break,
                _ => self.advance(),
            }
        }

        columns
    }

    /// Parse ON DELETE / ON UPDATE actions following a REFERENCES clause.
    fn parse_on_actions(&mut self) -> (Option<String>, Option<String>) {
        let mut on_delete = None;
        let mut on_update = None;

        while self.current() == &Token::On {
            self.advance();
            let is_delete = match self.current() {
                Token::Delete => true,
                Token::Update => false,
                _ => break,
            };
            self.advance();

            let action = match self.current().clone() {
                Token::Cascade => {
                    self.advance();
                    Some("CASCADE".to_string())
                }
                Token::Restrict => {
                    self.advance();
                    Some("RESTRICT".to_string())
                }
                t if t.is_ident("SET") => {
                    self.advance();
                    match self.current() {
                        Token::Null => {
                            self.advance();
                            Some("SET NULL".to_string())
                        }
                        Token::Default => {
                            self.advance();
                            Some("SET DEFAULT".to_string())
                        }
                        _ => None,
                    }
                }
                t if t.is_ident("NO") => {
                    self.advance();
                    if self.current().is_ident("ACTION") {
                        self.advance();
                        Some("NO ACTION".to_string())
                    } else {
                        None
                    }
                }
                _ => None,
            };

            if is_delete {
                on_delete = action;
            } else {
                on_update = action;
            }
        }

        (on_delete, on_update)
    }

    /// Parse `CREATE [UNIQUE] INDEX [IF NOT EXISTS] <name> ON <table>
    /// [USING <method>] (<columns>)`. Anything that does not fit is skipped.
    fn parse_create_index(&mut self) -> Option<(String, Index)> {
        let unique = self.current() == &Token::Unique;
        if unique {
            self.advance();
        }
        if self.current() != &Token::Index {
            self.skip_statement();
            return None;
        }
        self.advance();
        self.skip_if_not_exists();

        let name = match self.current().clone() {
            Token::Ident(n) => {
                self.advance();
                n
            }
            // PostgreSQL allows unnamed indexes
            _ => String::new(),
        };

        if self.current() != &Token::On {
            self.skip_statement();
            return None;
        }
        self.advance();

        let table = match self.parse_qualified_name() {
            Some(t) => t,
            None => {
                self.skip_statement();
                return None;
            }
        };

        if self.current().is_ident("USING") {
            self.advance();
            if matches!(self.current(), Token::Ident(_)) {
                self.advance();
            }
        }

        let columns = self.parse_column_list();
        self.skip_statement();

        Some((
            table,
            Index {
                name,
                columns,
                unique,
            },
        ))
    }

    /// Parse `COMMENT ON COLUMN <table>.<column> IS '<text>'`. Other COMMENT
    /// targets are skipped.
    fn parse_comment_on(&mut self) -> Option<(String, String, String)> {
        self.advance(); // COMMENT
        if self.current() != &Token::On {
            self.skip_statement();
            return None;
        }
        self.advance();

        if !self.current().is_ident("COLUMN") {
            self.skip_statement();
            return None;
        }
        self.advance();

        // schema.table.column or table.column; the last two segments matter.
        let mut segments: Vec<String> = Vec::new();
        loop {
            match self.current().clone() {
                Token::Ident(n) => {
                    segments.push(n);
                    self.advance();
                }
                _ => break,
            }
            if self.current() == &Token::Dot {
                self.advance();
            } else {
                break;
            }
        }
        if segments.len() < 2 {
            self.skip_statement();
            return None;
        }
        let column = segments.pop().unwrap();
        let table = segments.pop().unwrap();

        if !self.current().is_ident("IS") {
            self.skip_statement();
            return None;
        }
        self.advance();

        let text = match self.current().clone() {
            Token::Str(s) => {
                self.advance();
                s
            }
            _ => {
                self.skip_statement();
                return None;
            }
        };
        self.skip_statement();

        Some((table, column, text))
    }

    /// Parse `ALTER TABLE [ONLY] <table> ADD [CONSTRAINT <name>] FOREIGN KEY
    /// ...`. Other ALTER forms are skipped without diagnostics.
    fn parse_alter_table_fk(
        &mut self,
        diagnostics: &mut Vec<ParseError>,
    ) -> Result<Option<(String, ForeignKey)>, ParseError> {
        self.advance(); // ALTER

        if self.current() != &Token::Table {
            self.skip_statement();
            return Ok(None);
        }
        self.advance();

        if self.current() == &Token::Only {
            self.advance();
        }

        let table_name = match self.parse_qualified_name() {
            Some(n) => n,
            None => {
                self.skip_statement();
                return Ok(None);
            }
        };

        if self.current() != &Token::Add {
            self.skip_statement();
            return Ok(None);
        }
        self.advance();

        let name = if self.current() == &Token::Constraint {
            self.advance();
            match self.current().clone() {
                Token::Ident(n) => {
                    self.advance();
                    Some(n)
                }
                _ => None,
            }
        } else {
            None
        };

        if self.current() != &Token::Foreign {
            self.skip_statement();
            return Ok(None);
        }

        match self.parse_foreign_key(&table_name, name) {
            Ok(fk) => {
                self.skip_statement();
                Ok(Some((table_name, fk)))
            }
            Err(e) => {
                if self.strict() {
                    return Err(e);
                }
                diagnostics.push(e);
                self.skip_statement();
                Ok(None)
            }
        }
    }

    fn skip_if_not_exists(&mut self) {
        if self.current() == &Token::If {
            self.advance();
            if self.current() == &Token::Not {
                self.advance();
            }
            if self.current() == &Token::Exists {
                self.advance();
            }
        }
    }

    fn skip_parenthesized(&mut self) {
        if self.current() != &Token::LParen {
            return;
        }
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => {
                    depth += 1;
                    self.advance();
                }
                Token::RParen => {
                    depth -= 1;
                    self.advance();
                }
                Token::Eof => break,
                _ => self.advance(),
            }
        }
    }

    /// Skip to the end of the current clause: a top-level comma (consumed by
    /// the body loop) or the body's closing paren (left in place).
    fn skip_clause(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.current() {
                Token::LParen => {
                    depth += 1;
                    self.advance();
                }
                Token::RParen => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.advance();
                }
                Token::Comma if depth == 0 => break,
                Token::Semicolon | Token::Eof => break,
                _ => self.advance(),
            }
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        if self.current() == &Token::Semicolon {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> ParseResult {
        parse_sql(sql, Dialect::Postgres, ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_simple_table() {
        let result = parse(
            r#"
            CREATE TABLE users (
                id BIGSERIAL NOT NULL,
                name VARCHAR(255) NOT NULL,
                CONSTRAINT pk_users PRIMARY KEY (id)
            );
            "#,
        );

        assert_eq!(result.tables.len(), 1);
        assert!(result.diagnostics.is_empty());

        let users = &result.tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.columns.len(), 2);
        assert_eq!(users.primary_key, vec!["id"]);

        let id = &users.columns[0];
        assert_eq!(id.ty, "BIGSERIAL");
        assert!(id.not_null);
        assert!(id.auto_increment);

        let name = &users.columns[1];
        assert_eq!(name.ty, "VARCHAR");
        assert_eq!(name.length, Some(255));
        assert!(name.not_null);
    }

    #[test]
    fn test_columns_only_no_primary_key() {
        let result = parse("CREATE TABLE t (a INT, b TEXT, c BOOLEAN);");
        let table = &result.tables[0];
        assert_eq!(table.columns.len(), 3);
        assert!(table.primary_key.is_empty());
        assert!(table.foreign_keys.is_empty());
    }

    #[test]
    fn test_decimal_precision_and_scale() {
        let result = parse("CREATE TABLE items (price DECIMAL(10,2) NOT NULL);");
        let price = &result.tables[0].columns[0];
        assert_eq!(price.ty, "DECIMAL");
        assert_eq!(price.precision, Some(10));
        assert_eq!(price.scale, Some(2));
        assert_eq!(price.length, None);
        assert!(price.not_null);
    }

    #[test]
    fn test_nested_parens_do_not_truncate_body() {
        let result = parse(
            "CREATE TABLE t (price DECIMAL(10,2), note VARCHAR(80) DEFAULT 'a,b');",
        );
        let table = &result.tables[0];
        assert_eq!(table.columns.len(), 2);
        assert_eq!(
            table.columns[1].default,
            Some(DefaultExpr::Str("a,b".to_string()))
        );
    }

    #[test]
    fn test_multi_word_types() {
        let result = parse(
            r#"
            CREATE TABLE t (
                a TIMESTAMP WITH TIME ZONE,
                b TIMESTAMP WITHOUT TIME ZONE,
                c DOUBLE PRECISION,
                d CHARACTER VARYING(40)
            );
            "#,
        );
        let cols = &result.tables[0].columns;
        assert_eq!(cols[0].ty, "TIMESTAMP WITH TIME ZONE");
        assert_eq!(cols[1].ty, "TIMESTAMP WITHOUT TIME ZONE");
        assert_eq!(cols[2].ty, "DOUBLE PRECISION");
        assert_eq!(cols[3].ty, "CHARACTER VARYING");
        assert_eq!(cols[3].length, Some(40));
    }

    #[test]
    fn test_default_expressions() {
        let result = parse(
            r#"
            CREATE TABLE t (
                a TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                b TIMESTAMP DEFAULT NOW(),
                c BOOLEAN DEFAULT TRUE,
                d INT DEFAULT 0,
                e VARCHAR(20) DEFAULT 'pending',
                f UUID DEFAULT uuid_generate_v4(),
                g INT DEFAULT NULL
            );
            "#,
        );
        let cols = &result.tables[0].columns;
        assert_eq!(
            cols[0].default,
            Some(DefaultExpr::Call("CURRENT_TIMESTAMP".to_string()))
        );
        assert_eq!(cols[1].default, Some(DefaultExpr::Call("NOW()".to_string())));
        assert_eq!(cols[2].default, Some(DefaultExpr::Bool(true)));
        assert_eq!(cols[3].default, Some(DefaultExpr::Num("0".to_string())));
        assert_eq!(cols[4].default, Some(DefaultExpr::Str("pending".to_string())));
        assert_eq!(
            cols[5].default,
            Some(DefaultExpr::Call("uuid_generate_v4()".to_string()))
        );
        assert_eq!(cols[6].default, Some(DefaultExpr::Null));
    }

    #[test]
    fn test_foreign_key_constraint() {
        let result = parse(
            r#"
            CREATE TABLE posts (
                id BIGSERIAL,
                user_id BIGINT NOT NULL,
                CONSTRAINT pk_posts PRIMARY KEY (id),
                CONSTRAINT fk_posts_users FOREIGN KEY (user_id)
                    REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        );
        let posts = &result.tables[0];
        assert_eq!(posts.foreign_keys.len(), 1);

        let fk = &posts.foreign_keys[0];
        assert_eq!(fk.name.as_deref(), Some("fk_posts_users"));
        assert_eq!(fk.columns, vec!["user_id"]);
        assert_eq!(fk.referenced_table, "users");
        assert_eq!(fk.referenced_columns, vec!["id"]);
        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
        assert_eq!(fk.on_update, None);
    }

    #[test]
    fn test_unnamed_foreign_key() {
        let result = parse(
            "CREATE TABLE a (b_id INT, FOREIGN KEY (b_id) REFERENCES b(id));",
        );
        let fk = &result.tables[0].foreign_keys[0];
        assert_eq!(fk.name, None);
        assert_eq!(fk.columns, vec!["b_id"]);
    }

    #[test]
    fn test_inline_primary_key_and_references() {
        let result = parse(
            r#"
            CREATE TABLE orders (
                id INT PRIMARY KEY,
                user_id INT REFERENCES users(id) ON DELETE SET NULL
            );
            "#,
        );
        let orders = &result.tables[0];
        assert_eq!(orders.primary_key, vec!["id"]);
        assert_eq!(orders.foreign_keys.len(), 1);

        let fk = &orders.foreign_keys[0];
        assert_eq!(fk.columns, vec!["user_id"]);
        assert_eq!(fk.referenced_table, "users");
        assert_eq!(fk.referenced_columns, vec!["id"]);
        assert_eq!(fk.on_delete.as_deref(), Some("SET NULL"));
    }

    #[test]
    fn test_alter_table_foreign_key() {
        let result = parse(
            r#"
            CREATE TABLE users (id BIGSERIAL PRIMARY KEY);
            CREATE TABLE posts (id BIGSERIAL PRIMARY KEY, user_id BIGINT);
            ALTER TABLE ONLY posts
                ADD CONSTRAINT fk_posts_users FOREIGN KEY (user_id) REFERENCES users(id);
            "#,
        );
        let posts = &result.tables[1];
        assert_eq!(posts.foreign_keys.len(), 1);
        assert_eq!(posts.foreign_keys[0].referenced_table, "users");
    }

    #[test]
    fn test_create_index() {
        let result = parse(
            r#"
            CREATE TABLE users (id INT, email VARCHAR(255));
            CREATE UNIQUE INDEX idx_users_email ON users (email);
            CREATE INDEX idx_users_id ON users USING btree (id);
            "#,
        );
        let users = &result.tables[0];
        assert_eq!(users.indexes.len(), 2);
        assert!(users.indexes[0].unique);
        assert_eq!(users.indexes[0].name, "idx_users_email");
        assert_eq!(users.indexes[0].columns, vec!["email"]);
        assert!(!users.indexes[1].unique);
        assert_eq!(users.indexes[1].columns, vec!["id"]);
    }

    #[test]
    fn test_comment_on_column() {
        let result = parse(
            r#"
            CREATE TABLE users (id INT);
            COMMENT ON COLUMN users.id IS 'surrogate key';
            COMMENT ON TABLE users IS 'ignored';
            "#,
        );
        let id = &result.tables[0].columns[0];
        assert_eq!(id.comment.as_deref(), Some("surrogate key"));
    }

    #[test]
    fn test_unique_and_check_table_constraints() {
        let result = parse(
            r#"
            CREATE TABLE t (
                a INT,
                b INT,
                CONSTRAINT uq_ab UNIQUE (a, b),
                CHECK (a > 0)
            );
            "#,
        );
        let table = &result.tables[0];
        assert_eq!(table.constraints.len(), 2);
        assert_eq!(
            table.constraints[0],
            TableConstraint::Unique {
                name: Some("uq_ab".to_string()),
                columns: vec!["a".to_string(), "b".to_string()],
            }
        );
        assert!(matches!(
            &table.constraints[1],
            TableConstraint::Check { name: None, expression } if expression == "a > 0"
        ));
    }

    #[test]
    fn test_lenient_mode_skips_bad_clause_with_diagnostic() {
        let result = parse("CREATE TABLE t (a INT, 42 17, b TEXT);");
        let table = &result.tables[0];
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].name, "a");
        assert_eq!(table.columns[1].name, "b");
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0],
            ParseError::InvalidColumn { .. }
        ));
    }

    #[test]
    fn test_strict_mode_aborts_on_bad_clause() {
        let options = ParseOptions {
            strict_mode: true,
            ..ParseOptions::default()
        };
        let err = parse_sql(
            "CREATE TABLE t (a INT, 42 17, b TEXT);",
            Dialect::Postgres,
            options,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidColumn { .. }));
    }

    #[test]
    fn test_parse_twice_is_identical() {
        let sql = r#"
            CREATE TABLE users (id BIGSERIAL PRIMARY KEY, name VARCHAR(100));
            CREATE TABLE posts (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT,
                CONSTRAINT fk FOREIGN KEY (user_id) REFERENCES users(id)
            );
        "#;
        let first = parse(sql);
        let second = parse(sql);
        assert_eq!(first.tables, second.tables);
    }

    #[test]
    fn test_non_create_statements_are_skipped() {
        let result = parse(
            r#"
            SET search_path = public;
            INSERT INTO users VALUES (1, 'a;b');
            CREATE TABLE users (id INT);
            DROP TABLE old_users;
            "#,
        );
        assert_eq!(result.tables.len(), 1);
        assert_eq!(result.tables[0].name, "users");
    }

    #[test]
    fn test_unterminated_final_statement() {
        let result = parse("CREATE TABLE t (a INT, b TEXT");
        assert_eq!(result.tables.len(), 1);
        assert_eq!(result.tables[0].columns.len(), 2);
    }

    #[test]
    fn test_if_not_exists_and_qualified_names() {
        let result = parse(
            "CREATE TABLE IF NOT EXISTS public.users (id INT PRIMARY KEY);",
        );
        assert_eq!(result.tables[0].name, "users");
        assert_eq!(result.tables[0].primary_key, vec!["id"]);
    }

    #[test]
    fn test_unsupported_dialect() {
        let err = parse_sql("CREATE TABLE t (a INT);", Dialect::MySql, ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedDialect(Dialect::MySql)));
    }

    #[test]
    fn test_alter_unknown_table_reports_diagnostic() {
        let result = parse(
            "ALTER TABLE ghosts ADD CONSTRAINT fk FOREIGN KEY (x) REFERENCES users(id);",
        );
        assert!(result.tables.is_empty());
        assert!(matches!(
            result.diagnostics[0],
            ParseError::UnknownTable { .. }
        ));
    }
}
