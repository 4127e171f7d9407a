//! Export orchestration.
//!
//! An [`ExportController`] owns the busy flag of one export control and the
//! sink artifacts are delivered to. A request that arrives while another is
//! running is ignored and reported as [`ExportOutcome::Busy`]. Every failure,
//! panics included, ends as [`ExportOutcome::Failed`] with the flag cleared.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::document::ExportRequest;
use crate::guard::BusyFlag;
use crate::sink::ArtifactSink;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    Delivered { filename: String, bytes: usize },
    /// The row set was empty; nothing was produced.
    Empty,
    /// Another export was in flight; this request did nothing.
    Busy,
    Failed { reason: String },
}

impl ExportOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Handle to a background export.
#[derive(Debug)]
pub enum ExportTask {
    Running(JoinHandle<ExportOutcome>),
    /// Resolved without starting a thread (busy, or the spawn failed).
    Finished(ExportOutcome),
}

impl ExportTask {
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Running(handle) => handle.is_finished(),
            Self::Finished(_) => true,
        }
    }

    /// Block until the export completes.
    pub fn wait(self) -> ExportOutcome {
        match self {
            Self::Running(handle) => handle.join().unwrap_or_else(|payload| ExportOutcome::Failed {
                reason: panic_message(payload.as_ref()),
            }),
            Self::Finished(outcome) => outcome,
        }
    }
}

pub struct ExportController<S> {
    busy: BusyFlag,
    sink: Arc<S>,
}

impl<S: ArtifactSink + 'static> ExportController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            busy: BusyFlag::new(),
            sink: Arc::new(sink),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// True while an export holds the flag; the export control stays disabled.
    pub fn is_exporting(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Run an export on the calling thread.
    pub fn export(&self, request: &ExportRequest) -> ExportOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            tracing::debug!(filename = %request.filename, "export already in progress; request ignored");
            return ExportOutcome::Busy;
        };
        run_export(self.sink.as_ref(), request)
    }

    /// Run an export on a named worker thread. The flag is taken before this
    /// returns and released when the worker finishes.
    pub fn spawn_export(&self, request: ExportRequest) -> ExportTask {
        let Some(guard) = self.busy.try_acquire() else {
            tracing::debug!(filename = %request.filename, "export already in progress; request ignored");
            return ExportTask::Finished(ExportOutcome::Busy);
        };
        let sink = Arc::clone(&self.sink);
        let spawned = thread::Builder::new()
            .name("tradegrid-export".into())
            .spawn(move || {
                let _guard = guard;
                run_export(sink.as_ref(), &request)
            });
        match spawned {
            Ok(handle) => ExportTask::Running(handle),
            Err(err) => {
                tracing::error!(error = %err, "failed to start export worker");
                ExportTask::Finished(ExportOutcome::Failed {
                    reason: format!("failed to start export worker: {err}"),
                })
            }
        }
    }
}

/// Render and deliver one request, containing every failure.
pub fn run_export<S: ArtifactSink + ?Sized>(sink: &S, request: &ExportRequest) -> ExportOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| produce(sink, request))) {
        Ok(Ok(Some((filename, bytes)))) => {
            tracing::debug!(%filename, bytes, "export delivered");
            ExportOutcome::Delivered { filename, bytes }
        }
        Ok(Ok(None)) => {
            tracing::warn!(format = ?request.format, filename = %request.filename, "no data to export");
            ExportOutcome::Empty
        }
        Ok(Err(err)) => {
            let reason = format!("{err:#}");
            tracing::error!(error = %reason, "export failed");
            ExportOutcome::Failed { reason }
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(error = %reason, "export panicked");
            ExportOutcome::Failed { reason }
        }
    }
}

fn produce<S: ArtifactSink + ?Sized>(sink: &S, request: &ExportRequest) -> Result<Option<(String, usize)>> {
    let Some(artifact) = request
        .render()
        .with_context(|| format!("failed to build {}", request.artifact_name()))?
    else {
        return Ok(None);
    };
    sink.deliver(&artifact)
        .with_context(|| format!("failed to deliver {}", artifact.filename))?;
    Ok(Some((artifact.filename.clone(), artifact.len())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("panic: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("panic: {text}")
    } else {
        "panic during export".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Artifact, ExportFormat};
    use crate::sink::MemorySink;
    use serde_json::json;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use tradegrid_core::record::ColumnDescriptor;

    fn request() -> ExportRequest {
        ExportRequest::csv(
            vec![json!({"name": "Acme", "volume": 3})],
            vec![ColumnDescriptor::new("name", "Company")],
        )
        .with_filename("buyers")
    }

    /// Blocks inside `deliver` until the test sends a release.
    struct GateSink {
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl ArtifactSink for GateSink {
        fn deliver(&self, _artifact: &Artifact) -> Result<()> {
            self.entered.lock().unwrap().send(()).ok();
            self.release.lock().unwrap().recv().ok();
            Ok(())
        }
    }

    struct PanicSink;

    impl ArtifactSink for PanicSink {
        fn deliver(&self, _artifact: &Artifact) -> Result<()> {
            panic!("disk on fire");
        }
    }

    struct FailSink;

    impl ArtifactSink for FailSink {
        fn deliver(&self, _artifact: &Artifact) -> Result<()> {
            anyhow::bail!("quota exceeded")
        }
    }

    #[test]
    fn delivers_and_releases() {
        let controller = ExportController::new(MemorySink::new());
        let outcome = controller.export(&request());
        assert_eq!(
            outcome,
            ExportOutcome::Delivered {
                filename: "buyers.csv".into(),
                bytes: "Company\nAcme".len()
            }
        );
        assert!(!controller.is_exporting());
        assert_eq!(controller.sink().len(), 1);
    }

    #[test]
    fn empty_request_is_a_no_op() {
        let controller = ExportController::new(MemorySink::new());
        let outcome = controller.export(&ExportRequest::pdf(vec![], vec![]));
        assert_eq!(outcome, ExportOutcome::Empty);
        assert!(controller.sink().is_empty());
    }

    #[test]
    fn second_request_while_busy_is_ignored() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let controller = ExportController::new(GateSink {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });

        let task = controller.spawn_export(request());
        entered_rx.recv().unwrap();
        assert!(controller.is_exporting());
        assert_eq!(controller.export(&request()), ExportOutcome::Busy);
        assert_eq!(controller.spawn_export(request()).wait(), ExportOutcome::Busy);

        release_tx.send(()).unwrap();
        assert!(task.wait().is_delivered());
        assert!(!controller.is_exporting());
    }

    #[test]
    fn panic_is_contained_and_flag_cleared() {
        let controller = ExportController::new(PanicSink);
        match controller.export(&request()) {
            ExportOutcome::Failed { reason } => assert!(reason.contains("disk on fire")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!controller.is_exporting());

        let outcome = controller.spawn_export(request()).wait();
        assert!(matches!(outcome, ExportOutcome::Failed { .. }));
        assert!(!controller.is_exporting());
    }

    #[test]
    fn sink_errors_carry_context() {
        let controller = ExportController::new(FailSink);
        match controller.export(&request()) {
            ExportOutcome::Failed { reason } => {
                assert!(reason.contains("failed to deliver buyers.csv"));
                assert!(reason.contains("quota exceeded"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn render_errors_are_reported() {
        let controller = ExportController::new(MemorySink::new());
        let outcome = controller.export(&ExportRequest::new(ExportFormat::Csv, vec![json!({})], vec![]));
        assert!(matches!(outcome, ExportOutcome::Failed { reason } if reason.contains("no columns")));
        assert!(!controller.is_exporting());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(ExportOutcome::Busy).unwrap();
        assert_eq!(json, json!({"status": "busy"}));
    }
}
