//! Hook dispatch
//!
//! Every hook is a symlink to the same binary; the name it was invoked under
//! selects the handler.

use std::path::Path;

use tracing::info;

use crate::config::Settings;
use crate::controller::context::HookContext;
use crate::controller::error::Result;
use crate::controller::reconciler::{Outcome, shared_db_changed};

pub const SHARED_DB_RELATION_CHANGED: &str = "shared-db-relation-changed";

/// Name of the binary itself, for direct invocation with the hook as argument
pub const BINARY_NAME: &str = "shared-db-hooks";

/// Work out which hook is being run from the process arguments.
///
/// Uses the file name of `argv[0]`, or the first argument when run as
/// [`BINARY_NAME`].
pub fn hook_name(args: &[String]) -> Option<String> {
    let invoked = args.first()?;
    let name = Path::new(invoked).file_name()?.to_string_lossy().to_string();
    if name == BINARY_NAME {
        args.get(1).cloned()
    } else {
        Some(name)
    }
}

/// Run the handler registered for `hook`
pub async fn run_hook(hook: &str, settings: &Settings) -> Result<()> {
    match hook {
        SHARED_DB_RELATION_CHANGED => {
            let ctx = HookContext::from_settings(settings);
            match shared_db_changed(&ctx).await? {
                Outcome::NotLeader => info!(hook = %hook, "Skipped, not the leader"),
                Outcome::Published(published) => {
                    info!(hook = %hook, keys = published.len(), "Published relation settings")
                }
            }
            Ok(())
        }
        other => {
            info!(hook = %other, "This charm doesn't know how to handle '{}'", other);
            Ok(())
        }
    }
}
