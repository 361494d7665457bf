pub mod azure;
pub mod compressor;
pub mod dedup;
pub mod pipeline;
pub mod scanner;
pub mod thumbnail;
pub mod uploader;
