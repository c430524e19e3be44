//! JavaScript declaration walk: the shared JS/TS core without TypeScript
//! statement kinds.

use super::{js_ts, BuildCtx};
use scopegraph_core::error::Result;

pub(crate) fn build(ctx: &mut BuildCtx, root: tree_sitter::Node) -> Result<()> {
    js_ts::build_program(ctx, root, false)
}
