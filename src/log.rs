use std::env;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Level {
    Quiet = 0,
    Error = 1,
    Warn = 2,
}

impl Level {
    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "quiet" | "off" | "none" => Self::Quiet,
            "error" | "err" => Self::Error,
            _ => Self::Warn,
        }
    }
}

// Skipped-game and empty-run warnings are user-facing, so Warn is the
// default; batch runs can silence them with PGN_FRAGMENTS_LOG=quiet.
static FRAGMENT_LOG: LazyLock<Level> = LazyLock::new(|| {
    env::var("PGN_FRAGMENTS_LOG")
        .map(|s| Level::from_str(&s))
        .unwrap_or(Level::Warn)
});

macro_rules! log {
    ($level:expr, $prefix:expr, $msg:expr) => {
        if *FRAGMENT_LOG >= $level {
            eprintln!(concat!($prefix, ": {}"), $msg.as_ref());
        }
    };
}
pub fn error(msg: impl AsRef<str>) {
    log!(Level::Error, "ERROR", msg);
}
pub fn warn(msg: impl AsRef<str>) {
    log!(Level::Warn, "WARN", msg);
}
