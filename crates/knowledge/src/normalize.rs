//! Thread normalization.
//!
//! Flattens a thread into the labelled text layout the chunker and the
//! language model both see:
//!
//! ```text
//! Thread Title: <title>
//!
//! Original Post: <post_text>
//!
//! Response 1: <comment text>
//! ```

use crate::types::{Document, DocumentMetadata, Thread};

const BLOCK_SEPARATOR: &str = "\n\n";

/// Convert a thread into a document. Total and pure.
pub fn normalize(thread: &Thread) -> Document {
    let mut blocks = Vec::with_capacity(thread.comments.len() + 2);
    blocks.push(format!("Thread Title: {}", thread.title));
    blocks.push(format!("Original Post: {}", thread.post_text));

    for (i, comment) in thread.comments.iter().enumerate() {
        blocks.push(format!("Response {}: {}", i + 1, comment.text));
    }

    Document {
        text: blocks.join(BLOCK_SEPARATOR),
        metadata: DocumentMetadata {
            thread_id: thread.thread_id.clone(),
            source_label: thread.source_label.clone(),
            title: thread.title.clone(),
        },
    }
}
