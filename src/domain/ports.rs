use crate::domain::model::IntentStatus;
use crate::utils::error::Result;
use async_trait::async_trait;

/// The remote payment-intent API. Every method is a single request; retrying
/// is the caller's business.
#[async_trait]
pub trait IntentApi: Send + Sync {
    /// Returns the new intent id. An empty id means the create did not take.
    async fn create_intent(&self, merchant_id: &str) -> Result<String>;

    /// Returns the raw HTTP status code of the process call.
    async fn process_intent(
        &self,
        merchant_id: &str,
        terminal_id: &str,
        intent_id: &str,
    ) -> Result<u16>;

    async fn get_intent_status(&self, merchant_id: &str, intent_id: &str) -> Result<IntentStatus>;

    /// Returns the terminal's connectivity status, empty when the field is absent.
    async fn get_terminal_status(&self, merchant_id: &str, terminal_id: &str) -> Result<String>;
}
