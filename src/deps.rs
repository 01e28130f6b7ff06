//! Foreign-key dependency ordering.

use crate::ast::Table;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A foreign-key cycle spanning two or more tables.
#[derive(Debug, Error)]
#[error("circular foreign key reference involving tables: {}", tables.join(", "))]
pub struct CycleError {
    pub tables: Vec<String>,
}

/// Order tables so that every table referenced by a foreign key precedes the
/// table referencing it. Tables are borrowed, never copied or mutated.
///
/// References to tables absent from the input are treated as already
/// satisfied, as is a table referencing itself.
pub fn sort_by_dependencies(tables: &[Table]) -> Result<Vec<&Table>, CycleError> {
    let by_name: HashMap<&str, &Table> =
        tables.iter().map(|t| (t.name.as_str(), t)).collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut in_progress: Vec<&str> = Vec::new();
    let mut sorted: Vec<&Table> = Vec::with_capacity(tables.len());

    for table in tables {
        visit(table, &by_name, &mut visited, &mut in_progress, &mut sorted)?;
    }

    Ok(sorted)
}

fn visit<'a>(
    table: &'a Table,
    by_name: &HashMap<&str, &'a Table>,
    visited: &mut HashSet<&'a str>,
    in_progress: &mut Vec<&'a str>,
    sorted: &mut Vec<&'a Table>,
) -> Result<(), CycleError> {
    if visited.contains(table.name.as_str()) {
        return Ok(());
    }
    if let Some(pos) = in_progress.iter().position(|n| *n == table.name) {
        return Err(CycleError {
            tables: in_progress[pos..].iter().map(|n| n.to_string()).collect(),
        });
    }

    in_progress.push(table.name.as_str());
    for fk in &table.foreign_keys {
        if fk.referenced_table == table.name {
            continue;
        }
        if let Some(dep) = by_name.get(fk.referenced_table.as_str()).copied() {
            visit(dep, by_name, visited, in_progress, sorted)?;
        }
    }
    in_progress.pop();

    visited.insert(table.name.as_str());
    sorted.push(table);
    Ok(())
}
