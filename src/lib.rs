//! Stylec Stylesheet Compiler
//!
//! Compiles component stylesheets written in an extended CSS dialect into an
//! ordered sequence of output nodes: literal CSS text, and structural nodes
//! that reference other units (conditional wrappers, theme lookups).
//!
//! # Features
//!
//! - `@if(COND){}` / `@elseif(COND){}` / `@else{}` conditionals compiled into
//!   nested conditional nodes evaluated at render time
//! - Selector scoping under the component's generated class (`.THIS`)
//! - Namespace constant substitution and resource-relative `url()` rewriting
//! - `theme(ns.theme.var)` declarations compiled into theme nodes
//! - Every recoverable issue in a file reported at once, with line numbers
//!
//! # Basic Usage
//!
//! ```rust
//! use stylec::{compile_unit, CompilerOptions, Namespace, Result, StyleUnit};
//!
//! fn main() -> Result<()> {
//!     let unit = StyleUnit::new(
//!         ".THIS { color: red }",
//!         "button.css",
//!         Namespace::new("ui"),
//!         "uiButton",
//!     );
//!     let (nodes, _stats) = compile_unit(unit, CompilerOptions::default())?;
//!     assert_eq!(nodes.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! # Compilation Pipeline
//!
//! 1. **Preprocessor** - rewrite conditional directives into marker `@media` rules
//! 2. **Reader** - parse the stylesheet, recording recoverable issues
//! 3. **Visitor** - rework selectors and declarations, assemble text and
//!    structural nodes, nest conditional chains
//! 4. **Diagnostics** - raise one aggregated error if any issue was recorded

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod lexer;
pub mod node;
pub mod output;
pub mod parser;
pub mod preprocessor;
pub mod rework;
pub mod style_parser;
pub mod types;
pub mod visitor;
pub mod writer;

use serde::Serialize;
use std::path::Path;

// Re-export commonly used types and functions
pub use diagnostics::Diagnostics;
pub use error::{CompilerError, Issue, Location, Result};
pub use expression::{Expression, ExpressionBuilder, PropertyReferenceBuilder};
pub use node::{flatten_text, AttributeValue, NodeBuilder, OutputNode, StructuralNode};
pub use parser::{CssReader, StylesheetParser};
pub use preprocessor::{preprocess, Preprocessor};
pub use rework::{DynamicOutcome, DynamicRework, Rework, ReworkPipeline, ReworkResult};
pub use style_parser::{Compilation, StyleParser};
pub use types::*;
pub use cli::EnhancedCli;

/// Compiler version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Compilation options and settings
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Log each compilation phase
    pub debug_mode: bool,

    /// `Prod` writes compact CSS
    pub mode: Mode,

    /// Prefix for rewritten `url()` targets; the namespace name is appended
    pub resource_root: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            debug_mode: false,
            mode: Mode::Dev,
            resource_root: DEFAULT_RESOURCE_ROOT.to_string(),
        }
    }
}

/// Compilation statistics and metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompilationStats {
    /// Original source size in bytes
    pub source_size: u64,

    /// Style, media and verbatim rules visited, nested ones included
    pub rules_visited: usize,

    /// Text nodes emitted, including those inside conditional bodies
    pub text_nodes: usize,

    /// Structural nodes emitted, including else branches and nested nodes
    pub structural_nodes: usize,

    /// `@if` chains compiled
    pub conditional_groups: usize,

    /// Recoverable issues recorded
    pub issues: usize,

    /// Compilation time in milliseconds
    pub compile_time_ms: u64,
}

/// Compile one unit, raising recorded issues as a single aggregated error
pub fn compile_unit(unit: StyleUnit, options: CompilerOptions) -> Result<(Vec<OutputNode>, CompilationStats)> {
    if options.debug_mode {
        log::info!("{} v{}", NAME, VERSION);
        log::debug!("Compiler options: {:?}", options);
    }
    StyleParser::new(unit, options).parse_with_stats()
}

/// Compile stylesheet text for a component of `namespace`. The scoping
/// class is derived from the file stem, e.g. `ui` + `button.css` -> `uiButton`.
pub fn compile_source(source: &str, filename: &str, namespace: Namespace) -> Result<Vec<OutputNode>> {
    let class = default_component_class(&namespace.name, filename);
    let unit = StyleUnit::new(source, filename, namespace, class);
    compile_unit(unit, CompilerOptions::default()).map(|(nodes, _)| nodes)
}

/// Read a stylesheet from disk into a unit with the default scoping class
pub fn load_unit(input_path: &str, namespace: Namespace) -> Result<StyleUnit> {
    let source = std::fs::read_to_string(input_path).map_err(|e| CompilerError::FileNotFound {
        path: format!("{}: {}", input_path, e),
    })?;
    let class = default_component_class(&namespace.name, input_path);
    Ok(StyleUnit::new(source, input_path, namespace, class))
}

/// Main compiler entry point for a file on disk
pub fn compile_file(
    input_path: &str,
    namespace: Namespace,
    options: CompilerOptions,
) -> Result<(Vec<OutputNode>, CompilationStats)> {
    if options.debug_mode {
        log::info!("Compiling '{}'...", input_path);
    }
    let unit = load_unit(input_path, namespace)?;
    compile_unit(unit, options)
}

/// `<namespace><FileStem>` camel-cased
pub fn default_component_class(namespace: &str, path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    component_class_name(namespace, stem)
}
