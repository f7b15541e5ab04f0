use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, trace, warn};

use super::file::FileCandidate;
use super::preview::{Preview, PreviewHost, PreviewUrl};
use super::uploader::{BatchUploader, UploadFailure};
use crate::domain::{MIB, UploadConfig};
use crate::pagination::Pagination;

pub const MAX_QUEUE_SIZE: usize = 20;
pub const MAX_FILE_SIZE: u64 = 10 * MIB;
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// Why a candidate was not queued. The `Display` text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Only PDF and DOCX files allowed.")]
    UnsupportedType,

    #[error("File must be under {}.", size_limit_label(.limit))]
    TooLarge { limit: u64 },

    #[error("File already exists.")]
    Duplicate,

    #[error("Maximum {limit} files allowed at once.")]
    QueueFull { limit: usize },

    #[error("An upload is already in progress.")]
    Busy,

    #[error("Could not prepare a preview for this file.")]
    PreviewUnavailable,
}

/// Size limit in the largest unit that still reads naturally.
fn size_limit_label(limit: &u64) -> String {
    let limit = *limit;
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else if limit >= MIB {
        format!("{:.1}MB", limit as f64 / MIB as f64)
    } else if limit >= 1024 && limit % 1024 == 0 {
        format!("{}KB", limit / 1024)
    } else {
        format!("{limit} bytes")
    }
}

/// Outcome of one `add_files` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<(String, Rejection)>,
}

impl AddReport {
    pub fn saw_duplicate(&self) -> bool {
        self.rejected.iter().any(|(_, r)| *r == Rejection::Duplicate)
    }
}

/// A file accepted into the queue together with its preview.
#[derive(Debug)]
pub struct UploadEntry {
    file: FileCandidate,
    preview: Preview,
}

impl UploadEntry {
    pub fn file(&self) -> &FileCandidate {
        &self.file
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.file.size_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.file.mime_type
    }

    pub fn preview_url(&self) -> &PreviewUrl {
        self.preview.url()
    }

    fn release(self) {
        self.preview.release();
    }
}

/// How the presentation layer should open a queued file. PDFs open inline,
/// anything else is saved locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewAction {
    Inline { url: PreviewUrl },
    Download { url: PreviewUrl, file_name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRefused {
    #[error("no files queued")]
    Empty,
    #[error("an upload is already in progress")]
    InFlight,
}

/// Files handed out for one submission.
#[derive(Debug)]
pub struct SubmitBatch {
    files: Vec<FileCandidate>,
}

impl SubmitBatch {
    pub fn files(&self) -> &[FileCandidate] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Skipped(SubmitRefused),
    Uploaded { files: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    /// Position in the whole queue, use it for remove and preview.
    pub index: usize,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub preview_url: PreviewUrl,
}

/// Read-only state of the queue for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub entries: Vec<EntryView>,
    pub total: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub can_prev: bool,
    pub can_next: bool,
    pub last_error: Option<String>,
    pub phase: SubmitPhase,
}

/// Pending resume uploads.
///
/// Every entry owns a preview resource from the configured host. Removing an
/// entry, a successful submit and dropping the queue all release the previews
/// of the entries they discard.
pub struct UploadQueue {
    entries: Vec<UploadEntry>,
    page: Pagination,
    last_error: Option<String>,
    existing_names: HashSet<String>,
    config: UploadConfig,
    host: Arc<dyn PreviewHost>,
    phase: SubmitPhase,
}

impl UploadQueue {
    pub fn new(config: UploadConfig, host: Arc<dyn PreviewHost>) -> Self {
        Self {
            entries: Vec::new(),
            page: Pagination::new(config.page_size),
            last_error: None,
            existing_names: HashSet::new(),
            config,
            host,
            phase: SubmitPhase::Idle,
        }
    }

    /// Names already stored server side when the queue was opened.
    pub fn with_existing_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    fn is_duplicate(&self, name: &str) -> bool {
        self.existing_names.contains(name) || self.entries.iter().any(|e| e.name() == name)
    }

    fn check(&self, candidate: &FileCandidate) -> Result<(), Rejection> {
        if self.is_submitting() {
            return Err(Rejection::Busy);
        }
        if !self.config.allowed_mime_types.contains(&candidate.mime_type) {
            return Err(Rejection::UnsupportedType);
        }
        if candidate.size_bytes > self.config.max_file_size {
            return Err(Rejection::TooLarge {
                limit: self.config.max_file_size,
            });
        }
        if self.is_duplicate(&candidate.name) {
            return Err(Rejection::Duplicate);
        }
        if self.entries.len() >= self.config.max_queue_size {
            return Err(Rejection::QueueFull {
                limit: self.config.max_queue_size,
            });
        }
        Ok(())
    }

    fn admit(&mut self, candidate: FileCandidate) -> Result<String, (String, Rejection)> {
        if let Err(rejection) = self.check(&candidate) {
            return Err((candidate.name, rejection));
        }
        match Preview::acquire(&self.host, &candidate) {
            Ok(preview) => {
                let name = candidate.name.clone();
                self.entries.push(UploadEntry {
                    file: candidate,
                    preview,
                });
                Ok(name)
            }
            Err(e) => {
                warn!("{e}");
                Err((candidate.name, Rejection::PreviewUnavailable))
            }
        }
    }

    /// Validate and queue each candidate independently. Rejections never stop
    /// the rest of the batch. `last_error` is replaced by this call: the last
    /// rejection wins, except that a duplicate anywhere in the batch is always
    /// reported.
    pub fn add_files<I>(&mut self, candidates: I) -> AddReport
    where
        I: IntoIterator<Item = FileCandidate>,
    {
        self.last_error = None;
        let mut report = AddReport::default();

        for candidate in candidates {
            match self.admit(candidate) {
                Ok(name) => {
                    debug!("Queued {name}");
                    report.accepted.push(name);
                }
                Err((name, rejection)) => {
                    debug!("Rejected {name}: {rejection}");
                    report.rejected.push((name, rejection));
                }
            }
        }

        let surfaced = if report.saw_duplicate() {
            Some(Rejection::Duplicate)
        } else {
            report.rejected.last().map(|(_, r)| r.clone())
        };
        self.last_error = surfaced.map(|r| r.to_string());

        info!(
            "Added {} of {} files, queue holds {}",
            report.accepted.len(),
            report.accepted.len() + report.rejected.len(),
            self.entries.len()
        );
        report
    }

    /// Release the preview of the entry and drop it. Out of range indices and
    /// calls during a submission are ignored.
    pub fn remove_entry(&mut self, index: usize) -> bool {
        if self.is_submitting() {
            warn!("Ignoring removal of entry {index} while uploading");
            return false;
        }
        if index >= self.entries.len() {
            debug!("Ignoring removal of unknown entry {index}");
            return false;
        }
        let entry = self.entries.remove(index);
        trace!("Removing {}", entry.name());
        entry.release();
        self.page.clamp(self.entries.len());
        true
    }

    pub fn preview_entry(&self, index: usize) -> Option<PreviewAction> {
        let entry = self.entries.get(index)?;
        let url = entry.preview_url().clone();
        if entry.file.is_pdf() {
            Some(PreviewAction::Inline { url })
        } else {
            Some(PreviewAction::Download {
                url,
                file_name: entry.name().to_string(),
            })
        }
    }

    pub fn set_page(&mut self, index: usize) {
        self.page.set_index(index, self.entries.len());
    }

    pub fn next_page(&mut self) {
        self.page.next(self.entries.len());
    }

    pub fn previous_page(&mut self) {
        self.page.previous(self.entries.len());
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let total = self.entries.len();
        let range = self.page.range(total);
        QueueSnapshot {
            entries: self.entries[range.clone()]
                .iter()
                .zip(range)
                .map(|(entry, index)| EntryView {
                    index,
                    name: entry.name().to_string(),
                    size_bytes: entry.size_bytes(),
                    mime_type: entry.mime_type().to_string(),
                    preview_url: entry.preview_url().clone(),
                })
                .collect(),
            total,
            page_index: self.page.clamped_index(total),
            page_count: self.page.page_count(total),
            can_prev: self.page.can_prev(total),
            can_next: self.page.can_next(total),
            last_error: self.last_error.clone(),
            phase: self.phase,
        }
    }

    /// Enter the submitting state and hand out the files to send. Refused when
    /// nothing is queued or another submission has not completed yet.
    pub fn begin_submit(&mut self) -> Result<SubmitBatch, SubmitRefused> {
        if self.is_submitting() {
            return Err(SubmitRefused::InFlight);
        }
        if self.entries.is_empty() {
            return Err(SubmitRefused::Empty);
        }
        self.phase = SubmitPhase::Submitting;
        info!("Submitting {} files", self.entries.len());
        Ok(SubmitBatch {
            files: self.entries.iter().map(|e| e.file.clone()).collect(),
        })
    }

    /// Apply the result of the submission started by `begin_submit`. On
    /// success the queue is emptied, on failure it is kept for a retry.
    pub fn complete_submit(&mut self, batch: SubmitBatch, result: Result<(), UploadFailure>) -> SubmitOutcome {
        self.phase = SubmitPhase::Idle;
        match result {
            Ok(()) => {
                info!("Uploaded {} files", batch.len());
                self.release_all();
                self.last_error = None;
                SubmitOutcome::Uploaded { files: batch.len() }
            }
            Err(failure) => {
                let message = failure.message().to_string();
                warn!("Upload of {} files failed: {message}", batch.len());
                self.last_error = Some(message.clone());
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Leave the submitting state without touching the entries, for callers
    /// whose transport was torn down before it could report back.
    pub fn abort_submit(&mut self, batch: SubmitBatch) {
        debug!("Submission of {} files abandoned", batch.len());
        self.phase = SubmitPhase::Idle;
    }

    /// Send every queued file as one batch. No retry is attempted, calling
    /// `submit` again after a failure resends the same entries.
    #[instrument(skip_all)]
    pub async fn submit<U>(&mut self, uploader: &U) -> SubmitOutcome
    where
        U: BatchUploader + ?Sized,
    {
        let batch = match self.begin_submit() {
            Ok(batch) => batch,
            Err(refused) => {
                debug!("Submit skipped: {refused}");
                return SubmitOutcome::Skipped(refused);
            }
        };
        let in_flight = InFlight {
            queue: self,
            batch: Some(batch),
        };
        let result = uploader.upload(in_flight.files()).await;
        in_flight.finish(result)
    }

    fn release_all(&mut self) {
        let count = self.entries.len();
        for entry in self.entries.drain(..) {
            entry.release();
        }
        self.page.reset();
        if count > 0 {
            trace!("Released {count} previews");
        }
    }

    /// Release every preview, for when the owning panel closes.
    pub fn teardown(&mut self) {
        self.release_all();
        self.last_error = None;
    }

    /// Consume the queue, releasing every preview.
    pub fn close(mut self) {
        self.teardown();
        debug!("Upload queue closed");
    }
}

/// Submission owned by a `submit` future. Dropping the future before the
/// uploader answers returns the queue to `Idle` with its entries intact.
struct InFlight<'q> {
    queue: &'q mut UploadQueue,
    batch: Option<SubmitBatch>,
}

impl InFlight<'_> {
    fn files(&self) -> &[FileCandidate] {
        match &self.batch {
            Some(batch) => batch.files(),
            None => &[],
        }
    }

    fn finish(mut self, result: Result<(), UploadFailure>) -> SubmitOutcome {
        match self.batch.take() {
            Some(batch) => self.queue.complete_submit(batch, result),
            None => SubmitOutcome::Skipped(SubmitRefused::Empty),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(batch) = self.batch.take() {
            warn!("Submission of {} files dropped before completion", batch.len());
            self.queue.abort_submit(batch);
        }
    }
}

impl Drop for UploadQueue {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for UploadQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadQueue")
            .field("entries", &self.entries)
            .field("page", &self.page)
            .field("last_error", &self.last_error)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::file::{MIME_DOCX, MIME_PDF};
    use crate::upload::preview::ObjectUrlHost;

    fn pdf(name: &str) -> FileCandidate {
        FileCandidate::from_bytes(name, MIME_PDF, b"%PDF-1.7".to_vec())
    }

    struct Unresponsive;

    #[async_trait::async_trait]
    impl BatchUploader for Unresponsive {
        async fn upload(&self, _files: &[FileCandidate]) -> Result<(), UploadFailure> {
            std::future::pending().await
        }
    }

    struct Accepting;

    #[async_trait::async_trait]
    impl BatchUploader for Accepting {
        async fn upload(&self, _files: &[FileCandidate]) -> Result<(), UploadFailure> {
            Ok(())
        }
    }

    fn queue() -> (UploadQueue, Arc<ObjectUrlHost>) {
        let registry = Arc::new(ObjectUrlHost::default());
        let queue = UploadQueue::new(UploadConfig::default(), registry.clone());
        (queue, registry)
    }

    #[test]
    fn rejects_names_already_on_the_server() {
        let (queue, _) = queue();
        let mut queue = queue.with_existing_names(["resume.pdf"]);
        let report = queue.add_files([pdf("resume.pdf")]);
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected, vec![("resume.pdf".to_string(), Rejection::Duplicate)]);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.last_error(), Some("File already exists."));
    }

    #[test]
    fn rejects_names_already_queued() {
        let (mut queue, registry) = queue();
        queue.add_files([pdf("a.pdf"), pdf("a.pdf")]);
        assert_eq!(queue.len(), 1);
        assert_eq!(registry.live_count(), 1);
        queue.add_files([pdf("a.pdf")]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn capacity_is_enforced_without_dropping_entries() {
        let (mut queue, _) = queue();
        let report = queue.add_files((0..21).map(|i| pdf(&format!("cv_{i}.pdf"))));
        assert_eq!(report.accepted.len(), 20);
        assert_eq!(report.rejected, vec![("cv_20.pdf".to_string(), Rejection::QueueFull { limit: 20 })]);
        assert_eq!(queue.len(), 20);
        assert_eq!(queue.last_error(), Some("Maximum 20 files allowed at once."));
    }

    #[test]
    fn type_and_size_rejections_leave_queue_untouched() {
        let (mut queue, _) = queue();
        let big = FileCandidate::from_bytes("big.pdf", MIME_PDF, vec![0u8; 15 * MIB as usize]);
        let report = queue.add_files([big]);
        assert_eq!(report.rejected[0].1, Rejection::TooLarge { limit: 10 * MIB });
        assert_eq!(queue.last_error(), Some("File must be under 10MB."));

        let txt = FileCandidate::from_bytes("notes.txt", "text/plain", b"hi".to_vec());
        let report = queue.add_files([txt]);
        assert_eq!(report.rejected[0].1, Rejection::UnsupportedType);
        assert_eq!(queue.last_error(), Some("Only PDF and DOCX files allowed."));
        assert!(queue.is_empty());
    }

    #[test]
    fn exactly_ten_mib_is_accepted() {
        let (mut queue, _) = queue();
        let edge = FileCandidate::from_bytes("edge.pdf", MIME_PDF, vec![0u8; 10 * MIB as usize]);
        assert_eq!(queue.add_files([edge]).accepted.len(), 1);
    }

    #[test]
    fn partial_batches_keep_accepted_files_and_report_duplicates() {
        let (queue, _) = queue();
        let mut queue = queue.with_existing_names(["old.pdf"]);
        let report = queue.add_files([
            pdf("old.pdf"),
            pdf("new.pdf"),
            FileCandidate::from_bytes("x.txt", "text/plain", b"x".to_vec()),
        ]);
        assert_eq!(report.accepted, vec!["new.pdf"]);
        assert_eq!(report.rejected.len(), 2);
        // Duplicate wins over the later type error
        assert_eq!(queue.last_error(), Some("File already exists."));

        queue.add_files([pdf("other.pdf")]);
        assert_eq!(queue.last_error(), None);
    }

    #[test]
    fn remove_entry_releases_preview() {
        let (mut queue, registry) = queue();
        queue.add_files([pdf("a.pdf"), pdf("b.pdf")]);
        let url = queue.entries()[0].preview_url().clone();
        assert!(registry.is_live(&url));

        assert!(queue.remove_entry(0));
        assert!(!registry.is_live(&url));
        assert_eq!(registry.live_count(), 1);
        assert_eq!(queue.entries()[0].name(), "b.pdf");

        assert!(!queue.remove_entry(7));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn preview_dispatches_on_mime_type() {
        let (mut queue, _) = queue();
        queue.add_files([pdf("a.pdf"), FileCandidate::from_bytes("b.docx", MIME_DOCX, b"PK".to_vec())]);
        assert!(matches!(queue.preview_entry(0), Some(PreviewAction::Inline { .. })));
        match queue.preview_entry(1) {
            Some(PreviewAction::Download { file_name, .. }) => assert_eq!(file_name, "b.docx"),
            other => panic!("unexpected preview action {other:?}"),
        }
        assert_eq!(queue.preview_entry(2), None);
    }

    #[test]
    fn snapshot_pages_over_entries() {
        let (mut queue, _) = queue();
        queue.add_files((0..7).map(|i| pdf(&format!("{i}.pdf"))));
        let first = queue.snapshot();
        assert_eq!(first.page_count, 3);
        assert_eq!(first.entries.len(), 3);
        assert!(!first.can_prev && first.can_next);

        queue.set_page(9);
        let last = queue.snapshot();
        assert_eq!(last.page_index, 2);
        assert_eq!(last.entries.len(), 1);
        assert_eq!(last.entries[0].index, 6);
        assert_eq!(last.entries[0].name, "6.pdf");

        // Removing the only entry on the last page moves back a page
        queue.remove_entry(6);
        assert_eq!(queue.snapshot().page_index, 1);
    }

    #[test]
    fn submit_state_machine() {
        let (mut queue, registry) = queue();
        assert_eq!(queue.begin_submit().unwrap_err(), SubmitRefused::Empty);

        queue.add_files([pdf("a.pdf"), pdf("b.pdf")]);
        let batch = queue.begin_submit().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(queue.phase(), SubmitPhase::Submitting);
        assert_eq!(queue.begin_submit().unwrap_err(), SubmitRefused::InFlight);

        // Mutations wait for the submission to settle
        let report = queue.add_files([pdf("c.pdf")]);
        assert_eq!(report.rejected[0].1, Rejection::Busy);
        assert!(!queue.remove_entry(0));

        let outcome = queue.complete_submit(batch, Err(UploadFailure::new("Server exploded")));
        assert_eq!(outcome, SubmitOutcome::Failed { message: "Server exploded".into() });
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.last_error(), Some("Server exploded"));
        assert_eq!(queue.phase(), SubmitPhase::Idle);

        let batch = queue.begin_submit().unwrap();
        assert_eq!(queue.complete_submit(batch, Ok(())), SubmitOutcome::Uploaded { files: 2 });
        assert!(queue.is_empty());
        assert_eq!(queue.last_error(), None);
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn dropped_submit_returns_to_idle() {
        let (mut queue, registry) = queue();
        queue.add_files([pdf("a.pdf")]);

        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), queue.submit(&Unresponsive)).await;
        assert!(timed_out.is_err());
        assert_eq!(queue.phase(), SubmitPhase::Idle);
        assert_eq!(queue.len(), 1);
        assert_eq!(registry.live_count(), 1);

        assert_eq!(queue.add_files([pdf("b.pdf")]).accepted, vec!["b.pdf"]);
        assert!(queue.remove_entry(1));
        assert_eq!(queue.submit(&Accepting).await, SubmitOutcome::Uploaded { files: 1 });
        assert!(queue.is_empty());
    }

    #[test]
    fn size_limits_render_exactly() {
        assert_eq!(Rejection::TooLarge { limit: 10 * MIB }.to_string(), "File must be under 10MB.");
        assert_eq!(Rejection::TooLarge { limit: 4 }.to_string(), "File must be under 4 bytes.");
        assert_eq!(Rejection::TooLarge { limit: 512 * 1024 }.to_string(), "File must be under 512KB.");
        assert_eq!(Rejection::TooLarge { limit: 3 * MIB / 2 }.to_string(), "File must be under 1.5MB.");
    }

    #[test]
    fn abort_keeps_entries() {
        let (mut queue, _) = queue();
        queue.add_files([pdf("a.pdf")]);
        let batch = queue.begin_submit().unwrap();
        queue.abort_submit(batch);
        assert_eq!(queue.phase(), SubmitPhase::Idle);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn teardown_and_drop_release_everything() {
        let (mut queue, registry) = queue();
        queue.add_files([pdf("a.pdf"), pdf("b.pdf")]);
        queue.teardown();
        assert_eq!(registry.live_count(), 0);

        queue.add_files([pdf("c.pdf")]);
        assert_eq!(registry.live_count(), 1);
        drop(queue);
        assert_eq!(registry.live_count(), 0);

        let (mut queue, registry) = self::queue();
        queue.add_files([pdf("d.pdf")]);
        queue.close();
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn custom_limits() {
        let registry = Arc::new(ObjectUrlHost::default());
        let config = UploadConfig::default().max_queue_size(1).max_file_size(4).page_size(1);
        let mut queue = UploadQueue::new(config, registry);
        let report = queue.add_files([pdf("a.pdf"), FileCandidate::from_bytes("b.pdf", MIME_PDF, b"ab".to_vec())]);
        assert_eq!(report.rejected[0].1, Rejection::TooLarge { limit: 4 });
        assert_eq!(report.accepted, vec!["b.pdf"]);
        let report = queue.add_files([FileCandidate::from_bytes("c.pdf", MIME_PDF, b"c".to_vec())]);
        assert_eq!(report.rejected[0].1, Rejection::QueueFull { limit: 1 });
    }
}
