// Domain layer: request/response models and the calculator ports.

pub mod model;
pub mod ports;
