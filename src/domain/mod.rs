// Domain layer: core models and ports. Concrete HTTP/file code lives in adapters.

pub mod model;
pub mod ports;
