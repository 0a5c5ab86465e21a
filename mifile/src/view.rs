use faststr::FastStr;
use mifile_client::FileRecord;
use mifile_common::{SelectedFile, format_date, format_file_size};
use url::Url;

use crate::controller::Event;

pub const EMPTY_LISTING: &str = "No files found. Upload your first file!";
pub const MISSING_DATE: &str = "N/A";
pub const NO_FILE: &str = "None";

/// The display surface and native dialogs a host provides to the controller.
///
/// Every method is invoked from the controller's loop only, one at a time.
pub trait View {
    /// Native file chooser, `None` when the user cancels.
    fn choose_files(&mut self) -> Option<Vec<SelectedFile>>;

    /// Synchronous yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Hands a location to the host's own navigation, used for downloads.
    fn navigate(&mut self, url: &Url);

    fn set_file_info(&mut self, name: &str, size: &str);

    fn set_upload_enabled(&mut self, enabled: bool);

    fn set_drop_highlight(&mut self, highlighted: bool);

    fn show_progress(&mut self, visible: bool);

    fn set_progress(&mut self, percent: u8);

    fn set_loading(&mut self, visible: bool);

    fn render_files(&mut self, listing: &FileListing);

    fn show_modal(&mut self, notification: &Notification);

    fn hide_modal(&mut self);
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Tone {
    Success,
    Error,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Notification {
    pub tone: Tone,
    pub title: String,
    pub body: Vec<String>,
}

impl Notification {
    pub fn new<T, I, S>(tone: Tone, title: T, body: I) -> Self
    where
        T: ToString,
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            tone,
            title: title.to_string(),
            body: body.into_iter().map(|line| line.to_string()).collect(),
        }
    }

    pub fn success<T: ToString, I: IntoIterator<Item = S>, S: ToString>(title: T, body: I) -> Self {
        Self::new(Tone::Success, title, body)
    }

    pub fn error<T: ToString, I: IntoIterator<Item = S>, S: ToString>(title: T, body: I) -> Self {
        Self::new(Tone::Error, title, body)
    }
}

/// Action bound to a rendered row, carrying the server side identifier.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RowAction {
    Download(FastStr),
    Delete(FastStr),
}

impl From<RowAction> for Event {
    fn from(action: RowAction) -> Self {
        match action {
            RowAction::Download(id) => Event::Download(id),
            RowAction::Delete(id) => Event::Delete(id),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileRow {
    pub id: FastStr,
    pub name: String,
    pub tooltip: String,
    pub size: String,
    pub uploaded: String,
    pub download: RowAction,
    pub delete: RowAction,
}

impl From<&FileRecord> for FileRow {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.file_name.clone(),
            name: record.original_file_name.to_string(),
            tooltip: record.original_file_name.to_string(),
            size: format_file_size(record.size),
            uploaded: record
                .upload_date
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| MISSING_DATE.to_string()),
            download: RowAction::Download(record.file_name.clone()),
            delete: RowAction::Delete(record.file_name.clone()),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FileListing {
    Rows(Vec<FileRow>),
    Empty,
    Failed(String),
}

impl FileListing {
    pub fn from_records(records: &[FileRecord]) -> Self {
        if records.is_empty() {
            FileListing::Empty
        } else {
            FileListing::Rows(records.iter().map(FileRow::from).collect())
        }
    }

    /// Text shown in place of rows.
    pub fn message(&self) -> Option<&str> {
        match self {
            FileListing::Rows(_) => None,
            FileListing::Empty => Some(EMPTY_LISTING),
            FileListing::Failed(reason) => Some(reason),
        }
    }

    pub fn rows(&self) -> &[FileRow] {
        match self {
            FileListing::Rows(rows) => rows,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use faststr::FastStr;
    use mifile_client::FileRecord;

    use crate::{
        controller::Event,
        view::{EMPTY_LISTING, FileListing, MISSING_DATE, RowAction},
    };

    fn record(id: &str, name: &str, size: u64, date: Option<&str>) -> FileRecord {
        FileRecord {
            file_name: FastStr::new(id),
            original_file_name: FastStr::new(name),
            size,
            upload_date: date.map(ToString::to_string),
        }
    }

    #[test]
    pub fn test_empty_listing() {
        let listing = FileListing::from_records(&[]);
        assert_eq!(listing, FileListing::Empty);
        assert_eq!(listing.message(), Some(EMPTY_LISTING));
        assert!(listing.rows().is_empty());
    }

    #[test]
    pub fn test_rows_keep_server_order() {
        let records = vec![
            record("z9", "zebra.png", 2048, Some("2024-03-01T12:30:00")),
            record("a1", "apple.txt", 0, None),
        ];
        let listing = FileListing::from_records(&records);
        assert_eq!(listing.message(), None);

        let rows = listing.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "zebra.png");
        assert_eq!(rows[0].tooltip, "zebra.png");
        assert_eq!(rows[0].size, "2.00 KB");
        assert_eq!(rows[0].uploaded, "2024-03-01 12:30:00");
        assert_eq!(rows[1].id.as_str(), "a1");
        assert_eq!(rows[1].size, "0 Bytes");
        assert_eq!(rows[1].uploaded, MISSING_DATE);
    }

    #[test]
    pub fn test_row_actions_carry_identifier() {
        let listing = FileListing::from_records(&[record("abc123", "notes.txt", 1, None)]);
        let row = &listing.rows()[0];
        assert_eq!(row.download, RowAction::Download(FastStr::new("abc123")));

        match Event::from(row.delete.clone()) {
            Event::Delete(id) => assert_eq!(id.as_str(), "abc123"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
