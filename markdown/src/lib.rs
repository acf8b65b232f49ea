//! Markdown codec for [`localwrite_document::Document`].
//!
//! [`serialize`] and [`deserialize`] are total functions over a small fixed
//! grammar: headings, block quotes, check-list items, bulleted and numbered
//! lists, pipe tables, images, links and single-style inline spans. The
//! binding guarantee is structural: `deserialize(&serialize(&d))` is
//! structurally equal to `d` for documents built from these constructs.

mod deserialize;
mod inline;
mod serialize;

pub use deserialize::{deserialize, deserialize_opt};
pub use inline::parse_inline;
pub use serialize::{serialize, serialize_run};

use regex::Regex;

/// Compile one of the codec's constant patterns.
pub(crate) fn pattern(source: &str) -> Regex {
    match Regex::new(source) {
        Ok(regex) => regex,
        Err(err) => unreachable!("invalid codec pattern {source:?}: {err}"),
    }
}
