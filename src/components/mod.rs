pub mod key_hints;
pub mod listing;
pub mod preview;
