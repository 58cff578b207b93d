// Domain layer: models, diagnostics, editorial content and ports.

pub mod diagnostics;
pub mod editorial;
pub mod model;
pub mod ports;
