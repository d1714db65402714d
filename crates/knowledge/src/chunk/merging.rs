//! Greedy packing of split pieces into overlapping chunks.

use super::char_len;

/// Pack pieces (each at most `max_size - overlap` chars) into chunks of at
/// most `max_size` chars.
///
/// A new chunk starts with the last `overlap` chars of the previous one. The
/// previous chunk is always longer than `overlap` when that happens, since
/// adding the next piece pushed it past `max_size`.
pub(super) fn pack_pieces(pieces: &[&str], max_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(piece);

        if current_len > 0 && current_len + piece_len > max_size {
            let carried = tail_chars(&current, overlap).to_string();
            chunks.push(std::mem::take(&mut current));
            current_len = char_len(&carried);
            current = carried;
        }

        current.push_str(piece);
        current_len += piece_len;
    }

    if current_len > 0 {
        chunks.push(current);
    }

    chunks
}

/// The last `n` chars of `text` (all of it if shorter).
fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}
