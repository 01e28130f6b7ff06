//! SQL to Drizzle type mapping.

use crate::ast::{Column, DefaultExpr};
use thiserror::Error;

/// A Drizzle column constructor: function name, arguments, and chained
/// modifier calls in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrizzleType {
    pub function: &'static str,
    pub args: Vec<String>,
    pub chain: Vec<String>,
}

/// Mapping failure. Unreachable today — every type falls back to `text` —
/// but kept in the signature so callers handle it.
#[derive(Debug, Error)]
#[error("cannot map column {column} of type {ty}")]
pub struct MapTypeError {
    pub column: String,
    pub ty: String,
}

/// Map a parsed column to its Drizzle constructor.
pub fn map_column(column: &Column) -> Result<DrizzleType, MapTypeError> {
    let (function, extra) = match column.ty.as_str() {
        "BIGSERIAL" => ("bigserial", Some("{ mode: 'number' }".to_string())),
        "SERIAL" | "SMALLSERIAL" => ("serial", None),
        "BIGINT" | "INT8" => ("bigint", Some("{ mode: 'number' }".to_string())),
        "INTEGER" | "INT" | "INT4" => ("integer", None),
        "SMALLINT" | "INT2" => ("smallint", None),
        "VARCHAR" | "CHARACTER VARYING" => ("varchar", length_arg(column)),
        "CHAR" | "CHARACTER" => ("char", length_arg(column)),
        "TEXT" => ("text", None),
        "BOOLEAN" | "BOOL" => ("boolean", None),
        "TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ" => {
            ("timestamp", Some("{ withTimezone: true }".to_string()))
        }
        "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => ("timestamp", None),
        "DATE" => ("date", None),
        "TIME" | "TIME WITH TIME ZONE" | "TIME WITHOUT TIME ZONE" => ("time", None),
        "DECIMAL" | "NUMERIC" => ("decimal", precision_arg(column)),
        "REAL" | "FLOAT4" => ("real", None),
        "DOUBLE PRECISION" | "DOUBLE" | "FLOAT8" => ("doublePrecision", None),
        "UUID" => ("uuid", None),
        "JSON" => ("json", None),
        "JSONB" => ("jsonb", None),
        // Unknown types degrade to text so every column renders.
        _ => ("text", None),
    };

    let mut args = vec![format!("'{}'", column.name)];
    if let Some(extra) = extra {
        args.push(extra);
    }

    let mut chain = Vec::new();
    if column.not_null {
        chain.push("notNull()".to_string());
    }
    if column.unique {
        chain.push("unique()".to_string());
    }
    if let Some(default) = &column.default {
        if let Some(modifier) = default_modifier(default, &column.ty) {
            chain.push(modifier);
        }
    }

    Ok(DrizzleType {
        function,
        args,
        chain,
    })
}

fn length_arg(column: &Column) -> Option<String> {
    column.length.map(|l| format!("{{ length: {} }}", l))
}

fn precision_arg(column: &Column) -> Option<String> {
    match (column.precision, column.scale, column.length) {
        (Some(p), Some(s), _) => Some(format!("{{ precision: {}, scale: {} }}", p, s)),
        (_, _, Some(l)) => Some(format!("{{ precision: {} }}", l)),
        _ => None,
    }
}

/// Classify a parsed DEFAULT expression into a chained modifier, ordered
/// rules first-match-wins.
fn default_modifier(default: &DefaultExpr, ty: &str) -> Option<String> {
    match default {
        DefaultExpr::Call(call) if is_now_call(call) => {
            // A now-like default on a non-temporal column is dropped.
            is_temporal(ty).then(|| "defaultNow()".to_string())
        }
        DefaultExpr::Bool(true) => Some("default(true)".to_string()),
        DefaultExpr::Bool(false) => Some("default(false)".to_string()),
        DefaultExpr::Str(s) => Some(format!("default('{}')", escape(s))),
        DefaultExpr::Num(n) => Some(format!("default({})", n)),
        // Declaring the implicit default is a no-op.
        DefaultExpr::Null => None,
        // Other expressions are defensively quoted.
        DefaultExpr::Call(other) => Some(format!("default('{}')", escape(other))),
        DefaultExpr::Raw(raw) => Some(format!("default('{}')", escape(raw))),
    }
}

fn is_temporal(ty: &str) -> bool {
    ty.contains("TIMESTAMP") || ty == "DATE" || ty.starts_with("TIME")
}

fn is_now_call(call: &str) -> bool {
    let upper = call.to_uppercase();
    matches!(
        upper.trim_end_matches("()"),
        "NOW" | "CURRENT_TIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIME" | "LOCALTIMESTAMP"
            | "LOCALTIME"
    )
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Column;

    fn column(name: &str, ty: &str) -> Column {
        Column::new(name.to_string(), ty.to_string())
    }

    #[test]
    fn test_bigserial() {
        let mapped = map_column(&column("id", "BIGSERIAL")).unwrap();
        assert_eq!(mapped.function, "bigserial");
        assert_eq!(mapped.args, vec!["'id'", "{ mode: 'number' }"]);
    }

    #[test]
    fn test_serial_family_uses_distinct_constructors() {
        assert_eq!(map_column(&column("a", "SERIAL")).unwrap().function, "serial");
        assert_eq!(map_column(&column("a", "SMALLSERIAL")).unwrap().function, "serial");
        assert_eq!(map_column(&column("a", "BIGSERIAL")).unwrap().function, "bigserial");
        assert_eq!(map_column(&column("a", "BIGINT")).unwrap().function, "bigint");
    }

    #[test]
    fn test_varchar_with_length() {
        let mut col = column("name", "VARCHAR");
        col.length = Some(255);
        let mapped = map_column(&col).unwrap();
        assert_eq!(mapped.function, "varchar");
        assert_eq!(mapped.args, vec!["'name'", "{ length: 255 }"]);
    }

    #[test]
    fn test_varchar_without_length() {
        let mapped = map_column(&column("name", "VARCHAR")).unwrap();
        assert_eq!(mapped.args, vec!["'name'"]);
    }

    #[test]
    fn test_decimal_precision_and_scale() {
        let mut col = column("price", "DECIMAL");
        col.precision = Some(10);
        col.scale = Some(2);
        let mapped = map_column(&col).unwrap();
        assert_eq!(mapped.function, "decimal");
        assert_eq!(mapped.args, vec!["'price'", "{ precision: 10, scale: 2 }"]);
    }

    #[test]
    fn test_decimal_precision_only() {
        let mut col = column("price", "NUMERIC");
        col.length = Some(8);
        let mapped = map_column(&col).unwrap();
        assert_eq!(mapped.args, vec!["'price'", "{ precision: 8 }"]);
    }

    #[test]
    fn test_timestamp_with_timezone() {
        let mapped = map_column(&column("at", "TIMESTAMP WITH TIME ZONE")).unwrap();
        assert_eq!(mapped.function, "timestamp");
        assert_eq!(mapped.args, vec!["'at'", "{ withTimezone: true }"]);
    }

    #[test]
    fn test_unknown_type_falls_back_to_text() {
        let mapped = map_column(&column("geom", "GEOGRAPHY")).unwrap();
        assert_eq!(mapped.function, "text");
        assert_eq!(mapped.args, vec!["'geom'"]);
    }

    #[test]
    fn test_modifier_order() {
        let mut col = column("email", "VARCHAR");
        col.not_null = true;
        col.unique = true;
        col.default = Some(DefaultExpr::Str("none".to_string()));
        let mapped = map_column(&col).unwrap();
        assert_eq!(mapped.chain, vec!["notNull()", "unique()", "default('none')"]);
    }

    #[test]
    fn test_default_now_on_temporal() {
        let mut col = column("created_at", "TIMESTAMP");
        col.default = Some(DefaultExpr::Call("CURRENT_TIMESTAMP".to_string()));
        assert_eq!(map_column(&col).unwrap().chain, vec!["defaultNow()"]);

        let mut col = column("on_date", "DATE");
        col.default = Some(DefaultExpr::Call("NOW()".to_string()));
        assert_eq!(map_column(&col).unwrap().chain, vec!["defaultNow()"]);
    }

    #[test]
    fn test_default_now_dropped_on_non_temporal() {
        let mut col = column("n", "INTEGER");
        col.default = Some(DefaultExpr::Call("NOW()".to_string()));
        assert!(map_column(&col).unwrap().chain.is_empty());
    }

    #[test]
    fn test_default_literals() {
        let mut col = column("active", "BOOLEAN");
        col.default = Some(DefaultExpr::Bool(false));
        assert_eq!(map_column(&col).unwrap().chain, vec!["default(false)"]);

        let mut col = column("n", "INTEGER");
        col.default = Some(DefaultExpr::Num("42".to_string()));
        assert_eq!(map_column(&col).unwrap().chain, vec!["default(42)"]);

        let mut col = column("ratio", "REAL");
        col.default = Some(DefaultExpr::Num("0.5".to_string()));
        assert_eq!(map_column(&col).unwrap().chain, vec!["default(0.5)"]);
    }

    #[test]
    fn test_default_null_is_dropped() {
        let mut col = column("n", "INTEGER");
        col.default = Some(DefaultExpr::Null);
        assert!(map_column(&col).unwrap().chain.is_empty());
    }

    #[test]
    fn test_other_expressions_are_quoted() {
        let mut col = column("id", "UUID");
        col.default = Some(DefaultExpr::Call("uuid_generate_v4()".to_string()));
        assert_eq!(
            map_column(&col).unwrap().chain,
            vec!["default('uuid_generate_v4()')"]
        );
    }

    #[test]
    fn test_string_default_is_escaped() {
        let mut col = column("s", "TEXT");
        col.default = Some(DefaultExpr::Str("it's".to_string()));
        assert_eq!(map_column(&col).unwrap().chain, vec![r"default('it\'s')"]);
    }
}
