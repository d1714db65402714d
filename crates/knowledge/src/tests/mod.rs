//! Pipeline-level tests spanning several modules.

mod index_rebuild;
mod support;
