//! Content-based language sniffing for files the extension map cannot place.

use folio_core::Language;

/// Sniff a language from the first bytes of a file.
///
/// Used as a fallback when the extension is missing or ambiguous. The
/// detected language is fixed for the remainder of the file's analysis.
pub fn sniff_language(head: &[u8]) -> Option<Language> {
    let text = std::str::from_utf8(head).ok()?;
    let first_line = text.lines().next()?.trim();

    if let Some(lang) = sniff_shebang(first_line) {
        return Some(lang);
    }

    if text.contains("<?php") {
        return Some(Language::Php);
    }
    if first_line.starts_with("<!DOCTYPE html") || first_line.starts_with("<html") {
        return Some(Language::Html);
    }
    // Rust and Go have distinctive top-level tokens.
    if text.contains("fn main()") && text.contains("let ") {
        return Some(Language::Rust);
    }
    if text.contains("package main") && text.contains("func ") {
        return Some(Language::Go);
    }
    if text.contains("def ") && text.contains("import ") {
        return Some(Language::Python);
    }

    None
}

fn sniff_shebang(first_line: &str) -> Option<Language> {
    if !first_line.starts_with("#!") {
        return None;
    }
    let interpreter = first_line.trim_start_matches("#!").trim();
    if interpreter.contains("python") {
        Some(Language::Python)
    } else if interpreter.contains("node") {
        Some(Language::JavaScript)
    } else if interpreter.contains("ruby") {
        Some(Language::Ruby)
    } else if interpreter.ends_with("sh") || interpreter.contains("bash") {
        Some(Language::Shell)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shebang_python() {
        assert_eq!(
            sniff_language(b"#!/usr/bin/env python3\nprint('hi')\n"),
            Some(Language::Python)
        );
    }

    #[test]
    fn test_shebang_shell() {
        assert_eq!(sniff_language(b"#!/bin/bash\necho hi\n"), Some(Language::Shell));
        assert_eq!(sniff_language(b"#!/usr/bin/zsh\n"), Some(Language::Shell));
    }

    #[test]
    fn test_php_tag() {
        assert_eq!(sniff_language(b"<?php echo 1; ?>"), Some(Language::Php));
    }

    #[test]
    fn test_binary_content_yields_none() {
        assert_eq!(sniff_language(&[0xff, 0xfe, 0x00, 0x01]), None);
    }

    #[test]
    fn test_plain_text_yields_none() {
        assert_eq!(sniff_language(b"just some notes\n"), None);
    }
}
