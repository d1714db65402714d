//! Recursive separator-based splitting.

use super::char_len;
use unicode_segmentation::UnicodeSegmentation;

/// Separators from coarsest to finest. The empty separator means
/// "split into grapheme clusters".
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Split `text` into contiguous pieces of at most `budget` chars.
///
/// Concatenating the pieces gives back `text` exactly; separators stay
/// attached to the end of the piece before them.
pub(super) fn split_pieces(text: &str, budget: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    split_recursive(text, budget, 0, &mut pieces);
    pieces
}

fn split_recursive<'a>(text: &'a str, budget: usize, level: usize, out: &mut Vec<&'a str>) {
    if text.is_empty() {
        return;
    }
    if char_len(text) <= budget {
        out.push(text);
        return;
    }

    match SEPARATORS.get(level) {
        Some(sep) if !sep.is_empty() => {
            for segment in text.split_inclusive(sep) {
                split_recursive(segment, budget, level + 1, out);
            }
        }
        _ => {
            for grapheme in text.graphemes(true) {
                if char_len(grapheme) <= budget {
                    out.push(grapheme);
                } else {
                    hard_cut(grapheme, budget, out);
                }
            }
        }
    }
}

/// Cut by chars; only reached for a single grapheme longer than the budget.
fn hard_cut<'a>(text: &'a str, budget: usize, out: &mut Vec<&'a str>) {
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == budget {
            out.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pieces_concatenate_to_text() {
        let text = "First paragraph here.\n\nSecond line one\nSecond line two\n\nThird.";
        let pieces = split_pieces(text, 20);
        assert_eq!(pieces.concat(), text);
        assert!(pieces.iter().all(|p| char_len(p) <= 20));
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let text = "aaaa bbbb\n\ncccc dddd";
        let pieces = split_pieces(text, 12);
        assert_eq!(pieces, vec!["aaaa bbbb\n\n", "cccc dddd"]);
    }

    #[test]
    fn test_falls_back_to_words() {
        let pieces = split_pieces("alpha beta gamma", 6);
        assert_eq!(pieces, vec!["alpha ", "beta ", "gamma"]);
    }

    #[test]
    fn test_falls_back_to_graphemes() {
        let pieces = split_pieces("abcdef", 4);
        assert_eq!(pieces, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_oversized_grapheme_is_hard_cut() {
        // e + three combining marks: one grapheme, four chars
        let text = "e\u{301}\u{302}\u{303}";
        let pieces = split_pieces(text, 1);
        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces.concat(), text);
    }

    #[test]
    fn test_text_within_budget_is_one_piece() {
        assert_eq!(split_pieces("short", 10), vec!["short"]);
    }
}
