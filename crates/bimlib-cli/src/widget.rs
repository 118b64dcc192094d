// Upload widget state machine
//
// Holds at most one selected file plus the metadata form, validates the
// selection locally, and drives a single upload through a transport while
// reporting status, progress and notifications to an observer.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bimlib_core::{validate_upload, ModelRecord, UploadResponse, ValidationError, DEFAULT_MAX_UPLOAD_BYTES};

use crate::progress::{fraction, ProgressFn};

/// Pause between a successful upload and the browse navigation.
pub const DEFAULT_BROWSE_DELAY: Duration = Duration::from_millis(1500);

pub const STATUS_READY: &str = "Ready to upload. Fill in the model information below.";
pub const STATUS_STARTING: &str = "Starting upload...";
pub const STATUS_DONE: &str = "File uploaded successfully!";
pub const MSG_NO_FILE: &str = "Please select a file first.";
pub const MSG_UPLOADED: &str =
    "Model uploaded successfully! Your model is now available in the library.";

/// A local file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    /// File name without directories, as sent to the server.
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: meta.len(),
        })
    }
}

/// Metadata collected alongside the file. Lists are comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataForm {
    pub name: String,
    pub category: String,
    pub description: String,
    pub materials: String,
    pub specifications: String,
}

/// What the widget currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetView {
    /// Name of the selected file, shown with a way to clear it.
    pub file_name: Option<String>,
    pub form_visible: bool,
    pub progress_visible: bool,
    pub progress: f64,
    pub status: String,
}

/// Errors reported by the upload transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error! status: {status}{}", .message.as_ref().map(|m| format!(" ({})", m)).unwrap_or_default())]
    Http { status: u16, message: Option<String> },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Sends one upload to the catalog.
pub trait UploadTransport {
    fn upload(
        &self,
        file: &SelectedFile,
        form: &MetadataForm,
        on_progress: ProgressFn,
    ) -> Result<UploadResponse, TransportError>;
}

/// Receives everything the widget wants to show the user.
pub trait WidgetObserver: Send + Sync {
    /// The status line changed.
    fn status(&self, text: &str);

    /// Upload progress as a fraction in `0.0..=1.0`.
    fn progress(&self, fraction: f64);

    /// A message the user must acknowledge.
    fn notify(&self, message: &str);

    /// Navigate to the catalog browse view.
    fn browse(&self);
}

/// Outcomes of widget operations that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{}", MSG_NO_FILE)]
    NoFileSelected,

    #[error("Upload failed: {0}")]
    Rejected(String),

    #[error("Error uploading file: {0}")]
    Transport(#[from] TransportError),
}

pub struct UploadWidget<T, O> {
    transport: T,
    observer: Arc<O>,
    max_size: u64,
    browse_delay: Duration,
    selected: Option<SelectedFile>,
    form: MetadataForm,
    view: WidgetView,
}

impl<T, O> UploadWidget<T, O>
where
    T: UploadTransport,
    O: WidgetObserver + 'static,
{
    pub fn new(transport: T, observer: Arc<O>) -> Self {
        Self {
            transport,
            observer,
            max_size: DEFAULT_MAX_UPLOAD_BYTES,
            browse_delay: DEFAULT_BROWSE_DELAY,
            selected: None,
            form: MetadataForm::default(),
            view: WidgetView::default(),
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_browse_delay(mut self, delay: Duration) -> Self {
        self.browse_delay = delay;
        self
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn view(&self) -> &WidgetView {
        &self.view
    }

    pub fn form(&self) -> &MetadataForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut MetadataForm {
        &mut self.form
    }

    /// Offers files for selection. Only the first is considered; an empty
    /// list changes nothing. A file that fails validation is rejected with a
    /// notification and the current state is kept.
    pub fn select_files(&mut self, files: Vec<SelectedFile>) -> Result<(), WidgetError> {
        let Some(file) = files.into_iter().next() else {
            return Ok(());
        };

        if let Err(e) = validate_upload(&file.name, file.size, self.max_size) {
            self.observer.notify(&e.to_string());
            return Err(e.into());
        }

        self.view.file_name = Some(file.name.clone());
        self.view.progress_visible = true;
        self.view.form_visible = true;
        self.selected = Some(file);
        self.set_progress(0.0);
        self.set_status(STATUS_READY);
        Ok(())
    }

    /// Drops the selection and returns to the initial state.
    pub fn clear(&mut self) {
        self.selected = None;
        self.form = MetadataForm::default();
        self.view = WidgetView::default();
    }

    /// Uploads the selected file with the current form.
    ///
    /// On success the widget is reset and, after the browse delay, the
    /// observer is asked to show the catalog. On failure the selection and
    /// form are kept so the upload can be retried.
    pub fn submit(&mut self) -> Result<ModelRecord, WidgetError> {
        let Some(file) = self.selected.clone() else {
            self.observer.notify(MSG_NO_FILE);
            return Err(WidgetError::NoFileSelected);
        };

        self.view.progress_visible = true;
        self.set_progress(0.0);
        self.set_status(STATUS_STARTING);

        let observer = Arc::clone(&self.observer);
        let on_progress: ProgressFn =
            Arc::new(move |sent, total| observer.progress(fraction(sent, total)));

        let response = match self.transport.upload(&file, &self.form, on_progress) {
            Ok(response) => response,
            Err(e) => {
                let status = match &e {
                    TransportError::Http { .. } => format!("Upload failed: {}", e),
                    _ => format!("Error: {}", e),
                };
                self.set_status(&status);
                let err = WidgetError::Transport(e);
                self.observer.notify(&err.to_string());
                return Err(err);
            }
        };

        let record = match response {
            UploadResponse {
                success: true,
                model: Some(record),
                ..
            } => record,
            UploadResponse { message, .. } => {
                let message = message.unwrap_or_else(|| "no model in response".to_string());
                let err = WidgetError::Rejected(message);
                self.set_status(&err.to_string());
                self.observer.notify(&err.to_string());
                return Err(err);
            }
        };

        self.set_progress(1.0);
        self.set_status(STATUS_DONE);
        self.observer.notify(MSG_UPLOADED);
        self.clear();

        thread::sleep(self.browse_delay);
        self.observer.browse();

        Ok(record)
    }

    fn set_status(&mut self, text: &str) {
        self.view.status = text.to_string();
        self.observer.status(text);
    }

    fn set_progress(&mut self, fraction: f64) {
        self.view.progress = fraction;
        self.observer.progress(fraction);
    }
}
