use std::{
    collections::VecDeque,
    fmt::{Arguments, Display, Formatter},
    io::{self, BufRead, BufReader, Write},
};

use mifile_common::SelectedFile;
use tracing::warn;
use url::Url;

use crate::view::{FileListing, FileRow, Notification, Tone, View};

const NAME_WIDTH: usize = 40;
const BAR_WIDTH: usize = 30;

/// Line oriented `View` over a reader and a writer, stdin and stdout by default.
pub struct TerminalView {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
    assume_yes: bool,
    upload_enabled: bool,
    progress_visible: bool,
    progress_drawn: bool,
    rows: Vec<FileRow>,
    navigations: VecDeque<Url>,
    errors: usize,
}

impl TerminalView {
    pub fn new(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input,
            output,
            assume_yes: false,
            upload_enabled: false,
            progress_visible: false,
            progress_drawn: false,
            rows: vec![],
            navigations: VecDeque::new(),
            errors: 0,
        }
    }

    pub fn stdio() -> Self {
        Self::new(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// Answers every confirmation with yes.
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    pub fn upload_enabled(&self) -> bool {
        self.upload_enabled
    }

    /// Rows of the last successful listing.
    pub fn rows(&self) -> &[FileRow] {
        &self.rows
    }

    /// Number of failures shown so far, error notifications and failed listings.
    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn record_error(&mut self, message: &str) {
        self.errors += 1;
        self.print(format_args!("error: {message}\n"));
    }

    pub fn take_navigation(&mut self) -> Option<Url> {
        self.navigations.pop_front()
    }

    /// Prompts and reads one line, `None` on end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>, io::Error> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn println<D: Display>(&mut self, line: D) {
        self.print(format_args!("{line}\n"));
    }

    fn print(&mut self, args: Arguments<'_>) {
        if let Err(err) = self.output.write_fmt(args).and_then(|_| self.output.flush()) {
            warn!("terminal write error: {err}");
        }
    }

    fn end_progress_line(&mut self) {
        if self.progress_drawn {
            self.progress_drawn = false;
            self.print(format_args!("\n"));
        }
    }
}

impl View for TerminalView {
    fn choose_files(&mut self) -> Option<Vec<SelectedFile>> {
        let path = match self.read_line("File path: ") {
            Ok(Some(path)) if !path.is_empty() => path,
            Ok(_) => return None,
            Err(err) => {
                warn!("read file path error: {err}");
                return None;
            }
        };
        match SelectedFile::from_path(&path) {
            Ok(file) => Some(vec![file]),
            Err(err) => {
                self.println(format_args!("Cannot use {path}: {err}"));
                None
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match self.read_line(&format!("{prompt} [y/N] ")) {
            Ok(Some(answer)) => matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                warn!("read confirmation error: {err}");
                false
            }
        }
    }

    fn navigate(&mut self, url: &Url) {
        self.navigations.push_back(url.clone());
    }

    fn set_file_info(&mut self, name: &str, size: &str) {
        self.println(format_args!("Selected file: {name} ({size})"));
    }

    fn set_upload_enabled(&mut self, enabled: bool) {
        self.upload_enabled = enabled;
    }

    fn set_drop_highlight(&mut self, _highlighted: bool) {}

    fn show_progress(&mut self, visible: bool) {
        self.progress_visible = visible;
        if !visible {
            self.end_progress_line();
        }
    }

    fn set_progress(&mut self, percent: u8) {
        if !self.progress_visible {
            return;
        }
        self.progress_drawn = true;
        self.print(format_args!("\r{}", ProgressBar(percent)));
    }

    fn set_loading(&mut self, visible: bool) {
        if visible {
            self.println("Loading files...");
        }
    }

    fn render_files(&mut self, listing: &FileListing) {
        self.end_progress_line();
        match listing {
            FileListing::Rows(rows) => {
                self.rows = rows.clone();
                let table = FileTable(rows);
                self.print(format_args!("{table}"));
            }
            FileListing::Failed(reason) => {
                self.rows.clear();
                self.errors += 1;
                self.println(reason);
            }
            FileListing::Empty => {
                self.rows.clear();
                self.println(listing.message().unwrap_or_default());
            }
        }
    }

    fn show_modal(&mut self, notification: &Notification) {
        self.end_progress_line();
        if notification.tone == Tone::Error {
            self.errors += 1;
        }
        self.print(format_args!("{}", NotificationBox(notification)));
    }

    fn hide_modal(&mut self) {}
}

struct ProgressBar(u8);

impl Display for ProgressBar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let percent = self.0.min(100) as usize;
        let filled = percent * BAR_WIDTH / 100;
        write!(
            f,
            "[{}{}] {percent:>3}%",
            "#".repeat(filled),
            " ".repeat(BAR_WIDTH - filled)
        )
    }
}

struct NotificationBox<'a>(&'a Notification);

impl Display for NotificationBox<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let marker = match self.0.tone {
            Tone::Success => "+",
            Tone::Error => "!",
        };
        writeln!(f, "[{marker}] {}", self.0.title)?;
        for line in self.0.body.iter() {
            writeln!(f, "    {line}")?;
        }
        Ok(())
    }
}

struct FileTable<'a>(&'a [FileRow]);

impl Display for FileTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id_width = self
            .0
            .iter()
            .map(|row| row.id.chars().count())
            .max()
            .unwrap_or(0)
            .max(2);
        let size_width = self
            .0
            .iter()
            .map(|row| row.size.len())
            .max()
            .unwrap_or(0)
            .max(4);

        writeln!(
            f,
            "{:<id_width$}  {:<NAME_WIDTH$}  {:>size_width$}  UPLOADED",
            "ID", "NAME", "SIZE"
        )?;
        for row in self.0 {
            writeln!(
                f,
                "{:<id_width$}  {:<NAME_WIDTH$}  {:>size_width$}  {}",
                row.id.as_str(),
                truncate(&row.name, NAME_WIDTH),
                row.size,
                row.uploaded
            )?;
        }
        Ok(())
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut short: String = name.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
