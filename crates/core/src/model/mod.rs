pub mod call_tree;
pub mod forest;
pub mod session;

pub use call_tree::{CallTree, CallTreeNode, NodeId};
pub use forest::CallForest;
pub use session::{FlameSession, NodeDetail, ViewAction};
