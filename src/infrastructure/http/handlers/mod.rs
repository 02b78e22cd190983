//! HTTP Handlers

mod catalog;
mod lab;
mod ping;
mod voice;

#[cfg(test)]
mod test_support;

pub use catalog::*;
pub use lab::*;
pub use ping::*;
pub use voice::*;
