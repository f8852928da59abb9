//! Entity-level generation workflows used by the search session and the CLI.

pub(crate) mod dose;
pub(crate) mod image;
pub(crate) mod monograph;
