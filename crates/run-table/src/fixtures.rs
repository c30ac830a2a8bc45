//! Sample BehaviorSpace exports for testing.
//!
//! This module provides ready-made export files for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // run-table = { path = "../run-table", features = ["test-fixtures"] }
//!
//! use run_table::fixtures;
//!
//! std::fs::write(dir.join("sweep.csv"), fixtures::two_config_export())?;
//! ```

/// Export with six preamble lines and two configuration groups.
///
/// - `max-belief-factor = 0.5`: runs 1 and 2, one honest win and one
///   deceptive win at step 2
/// - `max-belief-factor = 0.8`: runs 3 and 4, one draw and one honest win
///
/// Rows of parallel runs are interleaved the way BehaviorSpace writes them.
pub fn two_config_export() -> &'static str {
    include_str!("../tests/fixtures/two_configs.csv")
}

/// Export with a single run of four steps and no terminal winner.
pub fn single_run_export() -> &'static str {
    include_str!("../tests/fixtures/single_run.csv")
}

/// Export whose header uses `[ticks]` instead of the `[step]` marker.
pub fn missing_step_export() -> &'static str {
    include_str!("../tests/fixtures/missing_step.csv")
}

/// Rebuilds the two-configuration export with `lines` preamble lines.
pub fn export_with_preamble(lines: usize) -> String {
    let table = two_config_export()
        .lines()
        .skip_while(|l| !l.contains(crate::STEP_MARKER))
        .collect::<Vec<_>>()
        .join("\n");

    let mut text = String::new();
    for i in 0..lines {
        text.push_str(&format!("\"preamble {}\"\n", i));
    }
    text.push_str(&table);
    text.push('\n');
    text
}
