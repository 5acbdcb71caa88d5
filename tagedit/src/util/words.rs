// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Splits a shell line into words. Single and double quotes group text,
/// a backslash escapes the next character outside single quotes, and `""`
/// yields an empty word.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err("Unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err("Unterminated double quote".to_string()),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err("Unterminated double quote".to_string()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err("Trailing backslash".to_string()),
                }
            }
            ch if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            ch => {
                in_word = true;
                current.push(ch);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(split_words("  list   all ").unwrap(), vec!["list", "all"]);
        assert!(split_words("   ").unwrap().is_empty());
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            split_words(r#"edit "Animation - Modified" name 'New Name'"#).unwrap(),
            vec!["edit", "Animation - Modified", "name", "New Name"]
        );
        assert_eq!(split_words(r#"add "" x"#).unwrap(), vec!["add", "", "x"]);
        assert_eq!(split_words(r#"say "a \"b\"""#).unwrap(), vec!["say", "a \"b\""]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(split_words("edit \"Animation").is_err());
        assert!(split_words("edit 'Animation").is_err());
    }
}
