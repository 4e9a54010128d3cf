use thiserror::Error;

/// Whatever a stream provider failed with, kept as is.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed xml at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("document has no root element")]
    Empty,

    #[error("document ended inside <{0}>")]
    Truncated(String),
}

impl Error {
    pub fn transport<E>(e: E) -> Self
    where
        E: Into<TransportError>,
    {
        Error::Transport(e.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}
