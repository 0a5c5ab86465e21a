use std::{future::Future, sync::Arc};

use faststr::FastStr;
use mifile_client::{
    ClientError, FileApi, FileRecord, ProgressFn, Reply, UploadProgress, UploadedFile,
};
use mifile_common::{SelectedFile, format_file_size};
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info, warn};

use crate::view::{FileListing, NO_FILE, Notification, View};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this file?";
pub const SERVER_DOWN: &str =
    "Could not connect to the server. Please make sure the server is running.";
pub const NO_SELECTION: &str = "Please select a file first.";

/// User gestures a host dispatches into the controller.
#[derive(Debug, Clone)]
pub enum Event {
    /// page ready: health check, bindings and the first listing
    Ready,
    CheckHealth,
    Refresh,
    DropAreaClicked,
    FilesChosen(Vec<SelectedFile>),
    DragOver,
    DragLeave,
    Dropped(Vec<SelectedFile>),
    UploadClicked,
    Download(FastStr),
    Delete(FastStr),
    CloseModal,
    ModalBackdropClicked,
}

/// Results posted back by background requests.
enum Completion {
    Health(Result<Value, ClientError>),
    Files(Result<Vec<FileRecord>, ClientError>),
    /// tagged with the upload it belongs to
    Progress(u64, UploadProgress),
    Uploaded(Result<Reply<UploadedFile>, ClientError>),
    Deleted(FastStr, Result<Reply<()>, ClientError>),
}

pub struct Controller<V> {
    api: Arc<dyn FileApi>,
    view: V,
    selected: Option<SelectedFile>,
    uploading: bool,
    // bumped on every upload start, stale progress reports carry an older value
    upload_seq: u64,
    modal: Option<Notification>,
    // spawned requests whose completion has not been handled yet
    pending: usize,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl<V: View> Controller<V> {
    pub fn new(api: Arc<dyn FileApi>, view: V) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            view,
            selected: None,
            uploading: false,
            upload_seq: 0,
            modal: None,
            pending: 0,
            tx,
            rx,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// The notification currently visible, if any.
    pub fn notification(&self) -> Option<&Notification> {
        self.modal.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn dispatch(&mut self, event: Event) {
        debug!("dispatch {event:?}");
        match event {
            Event::Ready => {
                self.check_health();
                self.reset_file_info();
                self.load_files();
            }
            Event::CheckHealth => self.check_health(),
            Event::Refresh => self.load_files(),
            Event::DropAreaClicked => match self.view.choose_files() {
                Some(files) => self.select_files(files),
                None => debug!("file chooser cancelled"),
            },
            Event::FilesChosen(files) => self.select_files(files),
            Event::DragOver => self.view.set_drop_highlight(true),
            Event::DragLeave => self.view.set_drop_highlight(false),
            Event::Dropped(files) => {
                self.view.set_drop_highlight(false);
                if !files.is_empty() {
                    self.select_files(files);
                }
            }
            Event::UploadClicked => self.upload(),
            Event::Download(file_name) => self.download(&file_name),
            Event::Delete(file_name) => self.delete(file_name),
            Event::CloseModal | Event::ModalBackdropClicked => self.close_modal(),
        }
    }

    /// Handles the next completion, returns false once nothing is outstanding.
    pub async fn process_next(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(completion) => {
                self.complete(completion);
                true
            }
            None => false,
        }
    }

    /// Drains completions until every spawned request has been handled.
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if tx.send(request.await).is_err() {
                debug!("controller dropped before request completed");
            }
        });
    }

    fn check_health(&mut self) {
        let api = self.api.clone();
        self.spawn(async move { Completion::Health(api.health().await) });
    }

    fn load_files(&mut self) {
        self.view.set_loading(true);
        let api = self.api.clone();
        self.spawn(async move { Completion::Files(api.list_files().await) });
    }

    fn select_files(&mut self, files: Vec<SelectedFile>) {
        if files.len() > 1 {
            debug!("{} files selected, only the first is used", files.len());
        }
        match files.into_iter().next() {
            Some(file) => {
                self.view
                    .set_file_info(&file.name, &format_file_size(file.size));
                self.view.set_upload_enabled(!self.uploading);
                self.selected = Some(file);
            }
            None => self.reset_file_info(),
        }
    }

    fn reset_file_info(&mut self) {
        self.selected = None;
        self.view.set_file_info(NO_FILE, &format_file_size(0));
        self.view.set_upload_enabled(false);
    }

    fn upload(&mut self) {
        if self.uploading {
            debug!("upload already in flight, ignoring");
            return;
        }
        let Some(file) = self.selected.clone() else {
            self.notify(Notification::error("Error", [NO_SELECTION]));
            return;
        };

        self.uploading = true;
        self.upload_seq += 1;
        self.view.set_progress(0);
        self.view.show_progress(true);
        self.view.set_upload_enabled(false);

        let tx = self.tx.clone();
        let seq = self.upload_seq;
        let progress: ProgressFn = Arc::new(move |progress| {
            let _ = tx.send(Completion::Progress(seq, progress));
        });
        let api = self.api.clone();
        self.spawn(async move { Completion::Uploaded(api.upload(&file, progress).await) });
    }

    fn download(&mut self, file_name: &str) {
        match self.api.download_url(file_name) {
            Ok(url) => {
                info!("downloading {file_name} from {url}");
                self.view.navigate(&url);
            }
            Err(err) => {
                error!("download {file_name} error: {err}");
                self.notify(Notification::error(
                    "Download Error",
                    [format!("Failed to download file: {err}")],
                ));
            }
        }
    }

    fn delete(&mut self, file_name: FastStr) {
        if !self.view.confirm(DELETE_PROMPT) {
            debug!("delete {file_name} declined");
            return;
        }
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.delete(&file_name).await;
            Completion::Deleted(file_name, result)
        });
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Progress(seq, progress) => {
                let current = self.uploading && seq == self.upload_seq;
                if let Some(percent) = progress.percent().filter(|_| current) {
                    self.view.set_progress(percent);
                }
                return;
            }
            Completion::Health(result) => self.health_checked(result),
            Completion::Files(result) => self.files_loaded(result),
            Completion::Uploaded(result) => self.upload_finished(result),
            Completion::Deleted(file_name, result) => self.delete_finished(&file_name, result),
        }
        self.pending = self.pending.saturating_sub(1);
    }

    fn health_checked(&mut self, result: Result<Value, ClientError>) {
        match result {
            Ok(health) => debug!("server health check: {health}"),
            Err(err) => {
                warn!("server health check failed: {err}");
                self.notify(Notification::error(
                    "Server Error",
                    [SERVER_DOWN.to_string(), format!("Error: {err}")],
                ));
            }
        }
    }

    fn files_loaded(&mut self, result: Result<Vec<FileRecord>, ClientError>) {
        self.view.set_loading(false);
        let listing = match result {
            Ok(records) => FileListing::from_records(&records),
            Err(err) => {
                error!("error loading files: {err}");
                FileListing::Failed(format!("Failed to load files: {err}"))
            }
        };
        self.view.render_files(&listing);
    }

    fn upload_finished(&mut self, result: Result<Reply<UploadedFile>, ClientError>) {
        let mut refresh = false;
        match result {
            Ok(Reply::Accepted { message, data }) => {
                let file_name = data.map(|file| file.file_name).unwrap_or_default();
                info!("uploaded as {file_name}: {message}");
                self.notify(Notification::success(
                    "Success",
                    [message, format!("File: {file_name}")],
                ));
                self.reset_file_info();
                refresh = true;
            }
            Ok(Reply::Rejected { message }) => {
                self.notify(Notification::error("Error", [message]));
            }
            Err(err) => {
                error!("upload error: {err}");
                self.notify(Notification::error(
                    "Upload Error",
                    [format!("Failed to upload file: {}", err.status_text())],
                ));
            }
        }

        self.uploading = false;
        self.view.show_progress(false);
        self.view.set_progress(0);
        self.view.set_upload_enabled(true);

        if refresh {
            self.load_files();
        }
    }

    fn delete_finished(&mut self, file_name: &str, result: Result<Reply<()>, ClientError>) {
        match result {
            Ok(Reply::Accepted { message, .. }) => {
                info!("deleted {file_name}: {message}");
                self.notify(Notification::success("Success", [message]));
                self.load_files();
            }
            Ok(Reply::Rejected { message }) => {
                self.notify(Notification::error("Error", [message]));
            }
            Err(err) => {
                error!("delete {file_name} error: {err}");
                self.notify(Notification::error(
                    "Delete Error",
                    [format!("Failed to delete file: {err}")],
                ));
            }
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.view.show_modal(&notification);
        self.modal = Some(notification);
    }

    fn close_modal(&mut self) {
        if self.modal.take().is_some() {
            self.view.hide_modal();
        }
    }
}
