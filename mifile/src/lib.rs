use std::sync::Arc;

use mifile_client::FileClient;
use mifile_common::SelectedFile;
use tracing::info;

mod args;
mod controller;
mod errors;
mod shell;
mod terminal;
mod view;

pub use args::{ClientOptions, Command, LogOptions, LogOutput, Opts};
pub use controller::{Controller, Event};
pub use errors::{Error, Result};
pub use shell::{ShellCommand, run_shell};
pub use terminal::TerminalView;
pub use view::{FileListing, FileRow, Notification, RowAction, Tone, View};

/// Runs one subcommand against the configured server.
///
/// Failures the controller reports through notifications are counted by the
/// terminal view and turned into `Error::Failed`.
pub async fn run(opts: Opts) -> Result<()> {
    let client = Arc::new(FileClient::new(opts.client.config())?);
    info!("using file server {}", client.server());

    let assume_yes = matches!(opts.command, Command::Delete { yes: true, .. });
    let view = TerminalView::stdio().assume_yes(assume_yes);
    let mut controller = Controller::new(client.clone(), view);

    match opts.command {
        Command::Health => {
            controller.dispatch(Event::CheckHealth);
            controller.settle().await;
            if controller.view().errors() == 0 {
                controller
                    .view_mut()
                    .println(format_args!("server {} is up", client.server()));
            }
        }
        Command::List => {
            controller.dispatch(Event::Refresh);
            controller.settle().await;
        }
        Command::Upload { path } => {
            let file = SelectedFile::from_path(&path)?;
            controller.dispatch(Event::FilesChosen(vec![file]));
            controller.dispatch(Event::UploadClicked);
            controller.settle().await;
        }
        Command::Download { file_name, output } => {
            controller.dispatch(Event::Download(file_name));
            controller.settle().await;
            shell::drain_downloads(&mut controller, &client, &output).await;
        }
        Command::Delete { file_name, .. } => {
            shell::dispatch_blocking(&mut controller, Event::Delete(file_name));
            controller.settle().await;
        }
        Command::Shell { download_dir } => {
            run_shell(&mut controller, &client, &download_dir).await?;
        }
    }

    match controller.view().errors() {
        0 => Ok(()),
        failed => Err(Error::Failed(failed)),
    }
}
