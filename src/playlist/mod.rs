//! Extended M3U playlist parsing
//!
//! The format is line oriented: anything before the `#EXTM3U` header is
//! ignored, then each entry is zero or more `#EXT<TAG>:<value>` directives
//! followed by the stream address. `#EXTINF` carries the channel name and
//! `#EXTVLCOPT` carries player options; other tags are accepted and ignored.
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1,Channel One
//! #EXTVLCOPT:program=1
//! udp://@239.1.1.1:1234
//! ```

pub mod line;
pub mod parser;
pub mod state;

pub use line::PlaylistLine;
pub use parser::{MalformedPolicy, PlaylistParser};
pub use state::{ParserState, PendingDirective, Section};
