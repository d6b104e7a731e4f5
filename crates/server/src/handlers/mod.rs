//! HTTP handlers, grouped by resource

pub mod buckets;
pub mod objects;
pub mod uploads;
