use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for locale code handling
///
/// Locale directories use the gettext form `xx_YY`, the remote translation
/// service uses `xx-YY`. Codes without a region are lower-case in both.

fn split_code(code: &str) -> (String, Option<String>) {
    let code = code.trim();
    let mut parts = code.splitn(2, ['-', '_']);
    let language = parts.next().unwrap_or_default().to_lowercase();
    let region = parts
        .next()
        .filter(|r| !r.is_empty())
        .map(|r| r.to_uppercase());
    (language, region)
}

/// Strip ISO reference-name qualifiers, e.g. `Modern Greek (1453-)` -> `Greek`
pub fn plain_language_name(name: &str) -> String {
    let name = match name.find(" (") {
        Some(i) => &name[..i],
        None => name,
    };
    name.strip_prefix("Modern ").unwrap_or(name).trim().to_string()
}

/// Convert a code to the local directory form, e.g. `pt-br` -> `pt_BR`
pub fn to_local_code(code: &str) -> String {
    match split_code(code) {
        (language, Some(region)) => format!("{}_{}", language, region),
        (language, None) => language,
    }
}

/// Convert a code to the remote service form, e.g. `pt_BR` -> `pt-BR`
pub fn to_remote_code(code: &str) -> String {
    match split_code(code) {
        (language, Some(region)) => format!("{}-{}", language, region),
        (language, None) => language,
    }
}

/// The language part of a code, e.g. `pt_BR` -> `pt`
pub fn base_language(code: &str) -> String {
    split_code(code).0
}

/// Check if two locale codes name the same locale, regardless of format
pub fn codes_match(code1: &str, code2: &str) -> bool {
    to_remote_code(code1) == to_remote_code(code2)
}

/// Get the English language name from a code, ignoring the region
pub fn get_language_name(code: &str) -> Result<String> {
    let base = base_language(code);
    let lang = match base.len() {
        2 => Language::from_639_1(&base),
        3 => Language::from_639_3(&base),
        _ => None,
    };

    lang.map(|l| l.to_name().to_string())
        .ok_or_else(|| anyhow!("Unknown language code: {}", code))
}
