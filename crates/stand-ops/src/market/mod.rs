//! Market edition workflows: vendor applications, pricing, statistics, and
//! the geocoding pipeline behind the stand map.

pub mod applications;
pub mod geocode;
pub mod pricing;
pub mod stats;
