use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use faststr::FastStr;
use mifile_client::ClientConfig;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "mifile")]
#[command(author, version, about, long_about = None)]
pub struct Opts {
    #[command(flatten)]
    pub log: LogOptions,
    #[command(flatten)]
    pub client: ClientOptions,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the file server is up
    Health,
    /// List stored files
    List,
    /// Upload one file
    Upload { path: PathBuf },
    /// Download a file by its server side name
    Download {
        file_name: FastStr,
        /// directory to save into
        #[arg(long, default_value("."))]
        output: PathBuf,
    },
    /// Delete a file by its server side name
    Delete {
        file_name: FastStr,
        /// skip the confirmation
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Interactive session
    Shell {
        #[arg(long, default_value("."))]
        download_dir: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ClientOptions {
    /// file server base url
    #[arg(long, default_value("http://127.0.0.1:8080"))]
    pub server: Url,
    /// request timeout in second, uploads and downloads are not limited
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
    /// connect timeout in second
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,
}

impl ClientOptions {
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            server: self.server.clone(),
            timeout: Duration::from_secs(self.timeout),
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    Off,
}

#[derive(Args, Debug, Clone)]
pub struct LogOptions {
    #[arg(long, default_value("./target/logs"))]
    pub log_path: FastStr,
    /// where console logs go, files under `log_path` are always written
    #[arg(long, value_enum, default_value_t = LogOutput::Stderr)]
    pub log_output: LogOutput,
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use crate::args::{Command, LogOutput, Opts};

    #[test]
    pub fn test_defaults() {
        let opts = Opts::parse_from(["mifile", "list"]);
        assert!(matches!(opts.command, Command::List));
        assert_eq!(opts.log.log_output, LogOutput::Stderr);
        assert!(!opts.log.debug);

        let config = opts.client.config();
        assert_eq!(config.server.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    pub fn test_subcommands() {
        let opts = Opts::parse_from([
            "mifile",
            "--server",
            "http://files.local:9000",
            "--log-output",
            "off",
            "delete",
            "abc123",
            "--yes",
        ]);
        assert_eq!(opts.client.server.as_str(), "http://files.local:9000/");
        assert_eq!(opts.log.log_output, LogOutput::Off);
        match opts.command {
            Command::Delete { file_name, yes } => {
                assert_eq!(file_name.as_str(), "abc123");
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let opts = Opts::parse_from(["mifile", "download", "abc123", "--output", "/tmp"]);
        match opts.command {
            Command::Download { file_name, output } => {
                assert_eq!(file_name.as_str(), "abc123");
                assert_eq!(output.to_str(), Some("/tmp"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    pub fn test_invalid_server() {
        assert!(Opts::try_parse_from(["mifile", "--server", "not a url", "list"]).is_err());
    }
}
