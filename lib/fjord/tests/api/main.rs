mod helpers;
mod pipeline;
mod streaming;
