// Content sniffing for incoming word-list bytes.

pub mod encoding;
