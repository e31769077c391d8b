//! Topology-aware vertex snapping: align a geometry's vertices with an existing reference
//! topology by inserting nearby reference-edge vertices and removing redundant interior ones.

mod addition;
mod candidate;
mod coverage;
mod driver;
mod edge_store;
mod error;
mod kernel;
mod removal;

pub use driver::{SnapConfig, snap};
pub use edge_store::{EdgeStore, InMemoryEdgeStore, ReferenceEdge};
pub use error::SnapError;
pub use kernel::{EuclideanKernel, GeometryKernel};
