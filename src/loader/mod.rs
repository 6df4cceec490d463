pub mod json_loader;
pub mod spawn_overrides;
