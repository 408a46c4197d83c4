pub mod classifier_client;
pub mod preview_service;
pub mod renderer;
