// Domain layer: conversation model and the ports adapters implement.

pub mod model;
pub mod ports;
