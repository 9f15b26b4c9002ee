//! Bit-preserving textual serialization of a lowered method body (§6).
//!
//! This is separate from the `Display` impls on the IR types themselves: those render a single
//! statement/expression in isolation, while this module additionally numbers and pads location
//! labels consistently across a whole body and backtick-quotes identifiers that need it.

use std::fmt::Write as _;

use crate::{location::LocationKind, method::MethodBody};

/// Render a full method body using the §6 textual conventions.
pub fn print_method(body: &MethodBody) -> String {
    let line_count = body
        .locations
        .iter()
        .filter(|loc| matches!(loc.kind, LocationKind::Stmt(_)))
        .count()
        .max(1);
    let width = digits(line_count);

    let mut out = String::new();
    let _ = writeln!(out, "{}", quote_signature(body.signature.as_str()));
    for location in &body.locations {
        match &location.kind {
            LocationKind::Label(label) => {
                let _ = writeln!(out, "#{}.", quote_ident(label.as_str()));
            }
            LocationKind::Stmt(stmt) => {
                let _ = writeln!(out, "#L{:0width$}. {}", location.display_index, stmt, width = width);
            }
        }
    }
    out
}

/// §6: `⌈log10(lineCount)⌉+1` digits, computed without floating point so values straddling a
/// power of ten (e.g. 99 vs. 100) don't round differently than the literal formula intends.
fn digits(n: usize) -> usize {
    let mut width = 0u32;
    let mut p: u128 = 1;
    while p < n as u128 {
        p *= 10;
        width += 1;
    }
    width as usize + 1
}

/// Wrap an identifier in backticks if it contains any character that would not be valid in a bare
/// identifier (§6: "Identifiers containing non-identifier characters are wrapped in backticks").
pub fn quote_ident(name: &str) -> String {
    let is_plain = !name.is_empty()
        && name.chars().next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false)
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_plain {
        name.to_string()
    } else {
        format!("`{name}`")
    }
}

fn quote_signature(sig: &str) -> String {
    format!("`{sig}`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_are_unquoted() {
        assert_eq!(quote_ident("int_temp"), "int_temp");
        assert_eq!(quote_ident("x$1"), "x$1");
    }

    #[test]
    fn identifiers_with_special_characters_are_backtick_quoted() {
        assert_eq!(quote_ident("While_start_0"), "While_start_0");
        assert_eq!(quote_ident("foo.bar"), "`foo.bar`");
        assert_eq!(quote_ident("9lives"), "`9lives`");
    }

    #[test]
    fn digit_width_matches_the_literal_ceil_log10_plus_one_formula() {
        // `⌈log10(lineCount)⌉+1`: a count just under a power of ten still gets the next power's
        // width, not the minimal digit count `lineCount` itself would print in.
        assert_eq!(digits(1), 1);
        assert_eq!(digits(9), 2);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(11), 3);
        assert_eq!(digits(99), 3);
        assert_eq!(digits(100), 3);
        assert_eq!(digits(101), 4);
    }
}
