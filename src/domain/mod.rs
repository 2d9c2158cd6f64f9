// Domain layer: core models, table definitions and ports. Adapters implement the ports.

pub mod model;
pub mod ports;
pub mod schema;
