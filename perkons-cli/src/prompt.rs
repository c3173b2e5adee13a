//! Confirmation prompts before touching the SD card
//!
//! Answers are read from any `BufRead`, so commands can be driven from
//! stdin or from a canned buffer.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .with_context(|| "Failed to read confirmation")?;
    Ok(line.trim().to_string())
}

fn ask(question: &str) -> Result<()> {
    print!("{}", question);
    io::stdout().flush()?;
    Ok(())
}

/// Ask a yes/no question; only `y` or `yes` counts as consent
///
/// End of input is a no.
pub fn confirm<R: BufRead>(input: &mut R, question: &str) -> Result<bool> {
    ask(&format!("{} [y/N]: ", question))?;
    let answer = read_answer(input)?.to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Require `expected` to be typed back exactly
pub fn confirm_exact<R: BufRead>(input: &mut R, expected: &str) -> Result<bool> {
    println!("To confirm, type exactly: {}", expected);
    ask("Confirmation: ")?;
    Ok(read_answer(input)? == expected)
}
