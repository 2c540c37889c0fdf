//! Blocking stdin prompts for the interactive report flow.

use anyhow::Result;
use std::io::{self, Write};

pub fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Parse a comma-separated 1-based selection ("1,3,5"). Empty or invalid
/// input selects everything, matching the interactive flow's forgiving
/// behavior.
pub fn parse_selection(input: &str, count: usize) -> Vec<usize> {
    let trimmed = input.trim();
    let all: Vec<usize> = (0..count).collect();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return all;
    }
    let mut picked = Vec::new();
    for part in trimmed.split(',') {
        match part.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => {
                if !picked.contains(&(n - 1)) {
                    picked.push(n - 1);
                }
            }
            Ok(_) => {} // out of range: ignore, keep the rest
            Err(_) => return all,
        }
    }
    if picked.is_empty() {
        all
    } else {
        picked
    }
}
