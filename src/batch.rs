//! Multi-document export: one artifact per document, streamed in order.
//!
//! Documents are processed strictly one after another, each on the blocking
//! pool via [`export_async`]. A failure of one document is yielded as an
//! `Err` item and the stream moves on to the next document.

use crate::error::PagesError;
use crate::export::{ExportEngine, ExportRequest, ExportTarget};
use crate::output::{export_async, ExportArtifact};
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{info, warn};

/// One stream item: the document's display name and its export result.
pub type BatchItem = (String, Result<ExportArtifact, PagesError>);

/// A boxed stream of per-document export results.
pub type ArtifactStream = Pin<Box<dyn Stream<Item = BatchItem> + Send>>;

/// Export every request to `target`, yielding results in request order.
pub fn export_stream(
    engine: Arc<ExportEngine>,
    requests: Vec<ExportRequest>,
    target: ExportTarget,
) -> ArtifactStream {
    info!(documents = requests.len(), %target, "Starting batch export");
    let s = stream::iter(requests).then(move |request| {
        let engine = Arc::clone(&engine);
        async move {
            let name = request.document().name().to_string();
            let result = export_async(engine, request, target).await;
            if let Err(e) = &result {
                warn!(document = %name, "{}", e);
            }
            (name, result)
        }
    });
    Box::pin(s)
}
