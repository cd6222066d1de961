//! Stateless helpers shared by the manifest store and the aggregator.

pub mod bom;
pub mod digest;
pub mod path;
pub mod text;
pub mod trim;
