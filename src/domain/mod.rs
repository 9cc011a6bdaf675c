// Domain layer: core models and ports (interfaces). Adapters under src/adapters implement the ports.

pub mod model;
pub mod ports;
