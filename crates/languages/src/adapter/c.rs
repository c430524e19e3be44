//! C declaration walk: the shared C-family core without C++ extensions.

use super::{c_cpp, BuildCtx};
use scopegraph_core::error::Result;

pub(crate) fn build(ctx: &mut BuildCtx, root: tree_sitter::Node) -> Result<()> {
    c_cpp::build_file(ctx, root, false)
}
