// Word-list sources: pluggable fetchers for asset URLs and local directories.

pub mod dir_source;
pub mod http_source;
pub mod traits;
