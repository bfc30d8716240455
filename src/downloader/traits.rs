// Extraction engine seam

use async_trait::async_trait;

use super::errors::EngineError;
use super::models::{FetchOptions, ProbeOptions, ProgressUpdate, RawInfo};

/// Progress callback invoked synchronously from within a fetch call.
pub type ProgressFn<'a> = &'a (dyn Fn(ProgressUpdate) + Send + Sync);

/// Interface to the extraction/download engine. The core drives it through
/// these two operations and never reaches around them.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &'static str;

    /// Metadata-only probe: enumerate the available formats without
    /// transferring media bytes. `Ok(None)` means the engine completed but
    /// produced no usable result.
    async fn probe(
        &self,
        url: &str,
        options: &ProbeOptions,
    ) -> Result<Option<RawInfo>, EngineError>;

    /// Fetch the selected streams and write them under the output template,
    /// reporting progress through `progress` as the transfer advances.
    async fn fetch_and_write(
        &self,
        url: &str,
        options: &FetchOptions,
        progress: ProgressFn<'_>,
    ) -> Result<(), EngineError>;
}
