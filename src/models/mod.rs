pub mod detect_types;
pub mod display_types;
