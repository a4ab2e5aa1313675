/// Figure layer: rendering one spike to an SVG document and writing saved
/// figures under their metadata-encoded names.

pub mod persist;
pub mod render;
