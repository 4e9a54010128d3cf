pub mod client;
pub mod date;
pub mod error;
pub mod model;
mod parser;
pub mod util;

pub use client::{Client, Config, Fetcher, FileFetcher, Stream};
pub use error::{DecodeError, Error, TransportError};
pub use model::{Channel, Enclosure, Image, Item, SkipDays, SkipHours};

use std::io::Read;

pub type Result<T> = std::result::Result<T, Error>;

/// Fetches an RSS 2.0 feed over HTTP with a default [`Client`].
pub fn fetch_channel(url: &str) -> Result<Channel> {
    fetch_channel_with(&Client::new(), url)
}

/// Opens `location` through `fetcher` and decodes it. The stream is dropped
/// before returning, whatever the outcome; nothing partial is returned.
pub fn fetch_channel_with<F: Fetcher + ?Sized>(fetcher: &F, location: &str) -> Result<Channel> {
    let stream = fetcher.open(location).map_err(Error::Transport)?;
    read_channel(stream)
}

/// Decodes a feed from an already open byte stream. Input must be UTF-8.
pub fn read_channel<R: Read>(reader: R) -> Result<Channel> {
    parser::from_reader(reader)
}
