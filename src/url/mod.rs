//! URL handling module for Site-Archiver
//!
//! This module is the link normalizer: it resolves discovered hrefs against the
//! page they were found on, strips fragments, rejects non-HTTP(S) links, and
//! applies the same-site policy based on the seed's registrable domain.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{registrable_domain, registrable_domain_of};
pub use normalize::{normalize_link, normalize_seed, requestable_seed, LinkFilter};
