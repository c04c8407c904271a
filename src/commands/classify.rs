//! Classify command implementation.

use anyhow::Result;

use crate::classifier::classify;

/// Run the classify command
pub fn run(lines: &[String]) -> Result<()> {
    for line in lines {
        println!("{}", describe(line));
    }
    Ok(())
}

fn describe(line: &str) -> String {
    match classify(line) {
        Ok(domain) => format!("{:?} -> {}", line, domain),
        Err(reason) => format!("{:?} rejected: {}", line, reason),
    }
}
