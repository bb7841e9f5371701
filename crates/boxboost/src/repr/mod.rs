//! Canonical model representations: SoA trees and the forest built from them.

pub mod forest;
pub mod tree;

pub use forest::{Forest, ForestValidationError};
pub use tree::{MutableTree, NodeId, Tree, TreeValidationError};
