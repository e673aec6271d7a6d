//! `rxscan doctor`: report which capabilities this build can use.

use anyhow::Result;
use rxscan_config::ScanConfig;

use crate::config::build_scanner;
use crate::terminal_output::{note_success, note_warn, render_table, GREEN, RED, RESET};

pub fn run(config: &ScanConfig) -> Result<()> {
    println!("\nChecking rxscan capabilities:\n");

    let env = build_scanner(config).environment();
    let status = |backend: &Option<String>| match backend {
        Some(name) => format!("{GREEN}{name}{RESET}"),
        None => format!("{RED}missing{RESET}"),
    };
    let rows = vec![
        vec!["symbol decoder".to_string(), status(&env.symbol_decoder)],
        vec!["fallback detector".to_string(), status(&env.fallback_detector)],
        vec!["text recognizer".to_string(), status(&env.text_recognizer)],
    ];
    print!("{}", render_table(&["Capability", "Backend"], &rows));

    let overrides = rxscan_config::active_overrides(|key| std::env::var(key).ok());
    if !overrides.is_empty() {
        println!("\nEnvironment overrides: {}", overrides.join(", "));
    }

    println!();
    if env.is_degraded() {
        note_warn(&format!(
            "Environment degraded: missing {}",
            env.missing().join(", ")
        ));
    } else {
        note_success("All capabilities available.");
    }
    Ok(())
}
