use async_trait::async_trait;

/// Boundary to the text-generation collaborator.
///
/// Implementations never fail at the call site: transport failures are
/// reported in-band as a body beginning with `ERROR:`, which the
/// downstream validator treats as a failure signal rather than model
/// content.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Submits a prompt (with an optional system instruction) and returns
    /// the response body.
    async fn generate(&self, system: Option<&str>, prompt: &str) -> String;
}
