//! Identifier case conversion for derived flag and env names.
//!
//! Both camel-case (`fooBar`, `FooBAR`) and snake-case (`foo_bar`) identifiers
//! are accepted. A word boundary is a lower-to-upper transition, the last
//! capital of an acronym followed by a lowercase letter, or an underscore.

/// `FooBar` / `foo_bar` to `foo-bar`.
pub fn to_kebab_case(ident: &str) -> String {
    convert(ident, '-', char::to_lowercase)
}

/// `FooBar` / `foo_bar` to `FOO_BAR`.
pub fn to_upper_snake_case(ident: &str) -> String {
    convert(ident, '_', char::to_uppercase)
}

fn convert<I>(ident: &str, sep: char, map: fn(char) -> I) -> String
where
    I: Iterator<Item = char>,
{
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev: Option<char> = None;

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with(sep) {
                out.push(sep);
            }
            prev = None;
            continue;
        }
        if let Some(p) = prev
            && c.is_uppercase()
        {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if p.is_lowercase() || (p.is_uppercase() && next_is_lower) {
                out.push(sep);
            }
        }
        out.extend(map(c));
        prev = Some(c);
    }

    if out.ends_with(sep) {
        out.pop();
    }
    out
}
