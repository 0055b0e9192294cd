pub mod listing;
pub mod navigator;
