//! Cooperative cancellation for the provenance pipeline.
//!
//! The caller shares a [`CancellationToken`] with the pipeline, which polls it
//! at directory-enumeration and file-read boundaries and fails with
//! [`Error::Cancelled`] once it fires. The token needs no async runtime.

use crate::error::{Error, Result};

pub use tokio_util::sync::CancellationToken;

/// Returns `Err(Error::Cancelled)` once `token` has been cancelled.
pub fn check(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let observer = token.clone();

        assert!(check(&observer).is_ok());
        token.cancel();

        assert!(observer.is_cancelled());
        assert!(matches!(check(&observer), Err(Error::Cancelled)));
    }

    #[test]
    fn test_child_token_follows_parent() {
        let parent = CancellationToken::new();
        let child = parent.child_token();

        parent.cancel();
        assert!(matches!(check(&child), Err(Error::Cancelled)));
    }
}
