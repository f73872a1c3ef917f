//! Auto-discovery of tools declared in external modules.
//!
//! A [`ToolModule`] stands in for an importable module: loading it runs its
//! registration hook, and a package is a module with submodules. Discovery
//! walks the tree depth-first, loading each module path at most once per
//! registry, and aborts on the first failing hook so a partial walk is
//! never mistaken for a complete one.

use crate::registry::{RegistryError, ToolRegistry};
use log::{debug, info};

/// One unit of tool code that registers itself when loaded.
pub trait ToolModule: Send + Sync {
    /// Unique dotted path identifying this module, e.g. `"my_tools.text"`.
    fn path(&self) -> &str;

    /// Registration hook, run once per registry when the module is
    /// discovered. Failures abort the surrounding discovery walk.
    fn register_tools(&self, registry: &ToolRegistry) -> anyhow::Result<()>;

    /// Nested modules. A plain module has none, which makes discovering it
    /// a no-op beyond its own hook.
    fn submodules(&self) -> Vec<&dyn ToolModule> {
        Vec::new()
    }
}

impl ToolRegistry {
    /// Walk `package` and its submodules, running each registration hook so
    /// the tools they declare land in this registry.
    ///
    /// Already-discovered module paths are skipped, so repeating a walk
    /// registers nothing new. A hook failure surfaces as
    /// [`RegistryError::Discovery`] naming the module, and stops the walk.
    pub fn autodiscover(&self, package: &dyn ToolModule) -> Result<(), RegistryError> {
        self.load_module(package)?;
        for submodule in package.submodules() {
            self.autodiscover(submodule)?;
        }
        Ok(())
    }

    fn load_module(&self, module: &dyn ToolModule) -> Result<(), RegistryError> {
        let path = module.path();
        if !self.mark_discovered(path) {
            debug!("module '{path}' already discovered, skipping");
            return Ok(());
        }

        if let Err(source) = module.register_tools(self) {
            // A failed load must be retryable later.
            self.unmark_discovered(path);
            return Err(RegistryError::Discovery {
                module: path.to_string(),
                source,
            });
        }

        info!("discovered tools from module '{path}'");
        Ok(())
    }
}
