// Domain layer: the schedule document, vendor records and ports. No I/O here.

pub mod keys;
pub mod model;
pub mod ports;
pub mod vendor;
