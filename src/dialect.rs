//! SQL dialect selection.

use std::fmt;

/// Supported SQL dialect variants.
///
/// Only PostgreSQL is implemented; the other variants are accepted on the
/// command line and rejected with a structured error at the parse/generate
/// dispatch points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// PostgreSQL
    #[default]
    Postgres,
    /// MySQL (not yet implemented)
    MySql,
    /// Cloud Spanner (not yet implemented)
    Spanner,
}

impl Dialect {
    /// Parse dialect from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "mysql" => Some(Self::MySql),
            "spanner" => Some(Self::Spanner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
            Self::Spanner => "spanner",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(Dialect::from_str("postgresql"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_str("Postgres"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_str("pg"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_str("mysql"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_str("spanner"), Some(Dialect::Spanner));
        assert_eq!(Dialect::from_str("oracle"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Dialect::Postgres.to_string(), "postgresql");
    }
}
