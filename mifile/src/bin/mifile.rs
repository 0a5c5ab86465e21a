use std::io::{stderr, stdout};

use clap::Parser;
use mifile::{LogOptions, LogOutput, Opts, run};
use tracing::{Level, debug};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, writer::BoxMakeWriter, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

fn log_init(opts: &LogOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = if opts.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter =
        EnvFilter::from_default_env().add_directive(format!("mifile={level}").parse()?);

    // the shell owns stdout, console logs stay off it unless asked for
    let console_layer = match opts.log_output {
        LogOutput::Off => None,
        LogOutput::Stdout => Some(BoxMakeWriter::new(stdout.with_max_level(level))),
        LogOutput::Stderr => Some(BoxMakeWriter::new(stderr.with_max_level(level))),
    }
    .map(|writer| {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed()
    });

    let file_appender = tracing_appender::rolling::daily(opts.log_path.as_str(), "mifile.log");

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_line_number(true)
        .with_writer(file_appender.with_max_level(level));

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();
    log_init(&opts.log)?;
    debug!("opts: {:?}", opts);

    run(opts).await?;
    Ok(())
}
