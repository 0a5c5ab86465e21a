use mifile_client::ClientError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} operation(s) failed")]
    Failed(usize),
}

pub type Result<T> = core::result::Result<T, Error>;
