// Domain layer: participant model, date rules and ports (interfaces).
// Nothing here performs I/O.

pub mod dates;
pub mod model;
pub mod ports;
