use stencil_core::Result;

use crate::tree::ConfigTree;

/// Custom configuration editing hooks around tree preparation.
///
/// `before_prepare` runs against the still-unprepared tree and is the only
/// safe point for raw mutation (e.g. normalizing a name) ahead of
/// validation. `after_prepare` runs against the fully prepared tree, in
/// reverse registration order across editors. Hook errors abort the
/// configuration load.
pub trait ConfigEditor {
    fn before_prepare(&self, _tree: &mut ConfigTree) -> Result<()> {
        Ok(())
    }

    fn after_prepare(&self, _tree: &mut ConfigTree) -> Result<()> {
        Ok(())
    }
}
