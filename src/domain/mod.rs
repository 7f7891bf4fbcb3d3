// Domain layer: GDP records and the ports the pipeline is wired through.

pub mod model;
pub mod ports;
