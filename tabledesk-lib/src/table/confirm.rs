//! Delete confirmation

use async_trait::async_trait;

/// Asks the user to confirm a destructive action.
///
/// Returns `true` if confirmed, `false` if declined.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way without asking anyone.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        log::debug!("auto-answering {:?} with {}", prompt, self.0);
        self.0
    }
}
