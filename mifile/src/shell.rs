use std::path::{Path, PathBuf};

use faststr::FastStr;
use mifile_client::FileClient;
use mifile_common::SelectedFile;
use tokio::task::block_in_place;
use tracing::{error, info};

use crate::{
    controller::{Controller, Event},
    errors::Result,
    terminal::TerminalView,
};

const PROMPT: &str = "mifile> ";

const HELP: &str = "\
commands:
  select <path>...   choose files, the first one is used
  drop <path>...     drag and drop files onto the upload area
  choose             open the file chooser
  clear              reset the selection
  upload             upload the selected file
  ls | refresh       list stored files
  get <id>           download a file
  rm <id>            delete a file
  close              dismiss the notification
  help               show this help
  quit | exit        leave the shell";

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ShellCommand {
    Select(Vec<PathBuf>),
    Drop(Vec<PathBuf>),
    Choose,
    Clear,
    Upload,
    Refresh,
    Get(FastStr),
    Rm(FastStr),
    Close,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return ShellCommand::Empty;
        };
        let args: Vec<&str> = words.collect();

        match (command, args.as_slice()) {
            ("select", [_, ..]) => ShellCommand::Select(args.iter().map(PathBuf::from).collect()),
            ("drop", [_, ..]) => ShellCommand::Drop(args.iter().map(PathBuf::from).collect()),
            ("choose", []) => ShellCommand::Choose,
            ("clear", []) => ShellCommand::Clear,
            ("upload", []) => ShellCommand::Upload,
            ("ls" | "refresh", []) => ShellCommand::Refresh,
            ("get", [id]) => ShellCommand::Get(FastStr::new(id)),
            ("rm", [id]) => ShellCommand::Rm(FastStr::new(id)),
            ("close", []) => ShellCommand::Close,
            ("help", []) => ShellCommand::Help,
            ("quit" | "exit", []) => ShellCommand::Quit,
            _ => ShellCommand::Invalid(line.trim().to_string()),
        }
    }
}

/// Dispatches from a blocking section, the view may prompt on stdin.
pub fn dispatch_blocking(controller: &mut Controller<TerminalView>, event: Event) {
    block_in_place(|| controller.dispatch(event));
}

/// Saves every location the controller navigated to since the last call.
pub async fn drain_downloads(
    controller: &mut Controller<TerminalView>,
    client: &FileClient,
    dir: &Path,
) {
    while let Some(url) = controller.view_mut().take_navigation() {
        match client.save(url.clone(), dir).await {
            Ok(path) => controller
                .view_mut()
                .println(format_args!("Saved {}", path.display())),
            Err(err) => {
                error!("download {url} error: {err}");
                controller
                    .view_mut()
                    .record_error(&format!("Failed to download file: {err}"));
            }
        }
    }
}

fn resolve(controller: &mut Controller<TerminalView>, paths: &[PathBuf]) -> Vec<SelectedFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match SelectedFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(err) => controller
                .view_mut()
                .println(format_args!("Cannot use {}: {err}", path.display())),
        }
    }
    files
}

pub async fn run_shell(
    controller: &mut Controller<TerminalView>,
    client: &FileClient,
    download_dir: &Path,
) -> Result<()> {
    info!("shell connected to {}", client.server());
    controller.dispatch(Event::Ready);
    controller.settle().await;

    loop {
        let Some(line) = block_in_place(|| controller.view_mut().read_line(PROMPT))? else {
            break;
        };

        let event = match ShellCommand::parse(&line) {
            ShellCommand::Select(paths) => {
                let files = resolve(controller, &paths);
                Event::FilesChosen(files)
            }
            ShellCommand::Drop(paths) => {
                controller.dispatch(Event::DragOver);
                let files = resolve(controller, &paths);
                Event::Dropped(files)
            }
            ShellCommand::Choose => Event::DropAreaClicked,
            ShellCommand::Clear => Event::FilesChosen(vec![]),
            ShellCommand::Upload => Event::UploadClicked,
            ShellCommand::Refresh => Event::Refresh,
            ShellCommand::Get(id) => Event::Download(id),
            ShellCommand::Rm(id) => Event::Delete(id),
            ShellCommand::Close => Event::CloseModal,
            ShellCommand::Help => {
                controller.view_mut().println(HELP);
                continue;
            }
            ShellCommand::Quit => break,
            ShellCommand::Empty => continue,
            ShellCommand::Invalid(line) => {
                controller
                    .view_mut()
                    .println(format_args!("unknown command: {line}, try `help`"));
                continue;
            }
        };

        dispatch_blocking(controller, event);
        controller.settle().await;
        drain_downloads(controller, client, download_dir).await;
    }
    Ok(())
}
