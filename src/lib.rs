pub mod ast;
pub mod deps;
pub mod dialect;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod types;

use wasm_bindgen::prelude::*;

use ast::ParseOptions;
use dialect::Dialect;
use generator::GeneratorOptions;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Convert SQL DDL text to a Drizzle ORM schema module
#[wasm_bindgen(js_name = "sqlToDrizzle")]
pub fn sql_to_drizzle(source: &str, dialect: Option<String>) -> Result<String, String> {
    let dialect = match dialect {
        Some(name) => {
            Dialect::from_str(&name).ok_or_else(|| format!("unsupported dialect: {}", name))?
        }
        None => Dialect::default(),
    };

    let result = parser::parse_sql(source, dialect, ParseOptions::default())
        .map_err(|e| e.to_string())?;

    generator::generate_schema(&result.tables, dialect, &GeneratorOptions::default())
        .map_err(|e| e.to_string())
}
