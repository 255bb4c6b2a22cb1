pub mod abstraction;
pub mod archetypes;
pub mod equity;
pub mod histogram;
pub mod kmeans;
pub mod layer;
pub mod lookup;
pub mod metric;
