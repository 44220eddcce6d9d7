//! `strongroom generate`: print a random password and its strength.

use console::style;

use crate::cli::output;
use crate::config::Settings;
use crate::crypto::{entropy_bits, generate_password, CharacterClasses};
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(length: Option<usize>, classes: CharacterClasses) -> Result<()> {
    let length = match length {
        Some(n) => n,
        None => Settings::load(&std::env::current_dir()?)?.password_length,
    };

    let password = generate_password(length, classes)?;
    println!("{password}");

    let bits = entropy_bits(length, classes);
    let label = strength_label(bits);
    eprintln!("{} {bits:.0} bits of entropy ({label})", style("\u{2139}").blue().bold());
    if bits < 64.0 {
        output::warning("Consider a longer password or more character classes.");
    }
    Ok(())
}

/// Rough strength buckets for the entropy display.
fn strength_label(bits: f64) -> &'static str {
    match bits {
        b if b < 40.0 => "weak",
        b if b < 64.0 => "fair",
        b if b < 100.0 => "strong",
        _ => "excellent",
    }
}
