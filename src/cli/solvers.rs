//! Solver backend listing.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::application::SolverRegistry;
use crate::cli::output;
use crate::error::Result;

#[derive(Tabled)]
struct SolverRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Available")]
    available: &'static str,
}

/// List registered solver backends.
pub fn list(registry: &SolverRegistry) -> Result<()> {
    if output::is_json() {
        let solvers: Vec<_> = registry
            .entries()
            .map(|(name, available)| json!({ "name": name, "available": available }))
            .collect();
        output::json_output(&json!({
            "command": "solvers.list",
            "solvers": solvers,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Solver backends");
    let rows: Vec<SolverRow> = registry
        .entries()
        .map(|(name, available)| SolverRow {
            name,
            available: if available { "yes" } else { "no" },
        })
        .collect();
    output::lines(&Table::new(rows).to_string());

    if !registry.entries().any(|(_, available)| available) {
        output::hint("rebuild with --features highs or --features microlp");
    }
    Ok(())
}
