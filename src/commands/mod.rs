pub mod detection;
pub mod selection;
