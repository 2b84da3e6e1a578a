//! Console logging setup.

use tracing::level_filters::LevelFilter;

/// Include the event target (module path) in every line.
pub const SHOW_TARGET: bool = true;

/// Prefix every line with a timestamp.
pub const SHOW_TIME: bool = false;

/// Map a `-v` count to a log level: 0 is warn, 1 is info, anything higher is debug.
pub fn level_for_verbosity(verbose_level: u8) -> LevelFilter {
    match verbose_level {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Install the process-wide console subscriber, writing to stderr.
///
/// Only the first call in a process installs anything; later calls return
/// `false` and leave the existing subscriber in place.
pub fn init(verbose_level: u8) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level_for_verbosity(verbose_level))
        .with_target(SHOW_TARGET)
        .with_writer(std::io::stderr);

    let installed = if SHOW_TIME {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };

    installed.is_ok()
}
