// src/acquisition/mod.rs
//! Channel store: recordings handed over by the acquisition reader

pub mod recording;

pub use recording::{ChannelId, ChannelPair, Recording, Stream};
