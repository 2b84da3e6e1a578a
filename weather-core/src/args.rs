//! Top-level option parsing with pass-through of unrecognized tokens.
//!
//! The dispatcher only understands a handful of global flags. Everything else
//! on the command line belongs to whichever command or provider gets picked,
//! so parsing is split in two steps: [`split_known`] sorts tokens using the
//! clap definition of [`Options`], then clap parses the known half.

use std::collections::HashMap;

use clap::{ArgAction, CommandFactory, Parser};

use crate::config::{DEFAULT_FORMATTER, DEFAULT_VERBOSE_LEVEL};

/// Global options, parsed once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "weather", version, about = "Weather aggregator")]
pub struct Options {
    /// Command or provider to run. Runs every provider when omitted.
    pub command: Option<String>,

    /// Bypass caches.
    #[arg(long)]
    pub refresh: bool,

    /// Show full error traces.
    #[arg(long)]
    pub debug: bool,

    /// Increase verbosity of output (repeatable).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose_level: u8,

    /// Output format.
    #[arg(short = 'f', long, default_value = DEFAULT_FORMATTER)]
    pub formatter: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            command: None,
            refresh: false,
            debug: false,
            verbose_level: DEFAULT_VERBOSE_LEVEL,
            formatter: DEFAULT_FORMATTER.to_string(),
        }
    }
}

/// Result of [`parse_known`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub options: Options,
    /// Tokens the dispatcher did not recognize, in their original order.
    pub remaining: Vec<String>,
}

/// Parse `argv` (without the binary name) into [`Options`] and leftover tokens.
pub fn parse_known<I, T>(argv: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();

    let mut cmd = Options::command();
    cmd.build();
    let (known, remaining) = split_known(&cmd, &argv);

    let name = cmd.get_name().to_string();
    let options = Options::try_parse_from(std::iter::once(name).chain(known))?;

    Ok(ParsedArgs { options, remaining })
}

/// Split `argv` into the tokens `cmd` declares and everything else.
///
/// The first bare token is taken as `cmd`'s positional; later bare tokens are
/// passed through. After `--` the positional is still bound if nothing took it
/// yet, and the rest is passed through.
///
/// Help and version flags belong to `cmd` only while no positional has been
/// seen. After that they are the resolved runnable's business.
pub fn split_known(cmd: &clap::Command, argv: &[String]) -> (Vec<String>, Vec<String>) {
    let flags = FlagTable::from_command(cmd);

    let mut known = Vec::new();
    let mut remaining = Vec::new();
    let mut positional_taken = false;

    let mut tokens = argv.iter();
    while let Some(token) = tokens.next() {
        if token == "--" {
            if !positional_taken {
                if let Some(positional) = tokens.next() {
                    known.push(token.clone());
                    known.push(positional.clone());
                }
            }
            remaining.extend(tokens.by_ref().cloned());
            break;
        }

        if let Some(long) = token.strip_prefix("--") {
            let (name, inline_value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };

            match flags.longs.get(name) {
                Some(flag) if flag.leading_only && positional_taken => remaining.push(token.clone()),
                Some(flag) => {
                    known.push(token.clone());
                    if flag.takes_value && inline_value.is_none() {
                        known.extend(tokens.next().cloned());
                    }
                }
                None => remaining.push(token.clone()),
            }
            continue;
        }

        if let Some(cluster) = token.strip_prefix('-').filter(|c| !c.is_empty()) {
            match flags.short_cluster(cluster, positional_taken) {
                ShortCluster::Unknown => remaining.push(token.clone()),
                ShortCluster::Complete => known.push(token.clone()),
                ShortCluster::NeedsValue => {
                    known.push(token.clone());
                    known.extend(tokens.next().cloned());
                }
            }
            continue;
        }

        if positional_taken {
            remaining.push(token.clone());
        } else {
            positional_taken = true;
            known.push(token.clone());
        }
    }

    (known, remaining)
}

/// Named flags of a clap command.
struct FlagTable {
    longs: HashMap<String, Flag>,
    shorts: HashMap<char, Flag>,
}

#[derive(Clone, Copy)]
struct Flag {
    takes_value: bool,
    /// Help and version: only recognized before the positional.
    leading_only: bool,
}

enum ShortCluster {
    Unknown,
    Complete,
    NeedsValue,
}

impl FlagTable {
    fn from_command(cmd: &clap::Command) -> Self {
        let mut longs = HashMap::new();
        let mut shorts = HashMap::new();

        for arg in cmd.get_arguments().filter(|arg| !arg.is_positional()) {
            let action = arg.get_action();
            let flag = Flag {
                takes_value: action.takes_values(),
                leading_only: matches!(
                    action,
                    ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
                ),
            };
            if let Some(long) = arg.get_long() {
                longs.insert(long.to_string(), flag);
            }
            if let Some(short) = arg.get_short() {
                shorts.insert(short, flag);
            }
        }

        Self { longs, shorts }
    }

    /// `-vv` is complete, `-f` needs the next token, `-ftable` carries its
    /// value inline. One unknown letter makes the whole cluster unknown, and so
    /// does a help or version letter once the positional is taken.
    fn short_cluster(&self, cluster: &str, positional_taken: bool) -> ShortCluster {
        for (idx, c) in cluster.char_indices() {
            match self.shorts.get(&c) {
                None => return ShortCluster::Unknown,
                Some(flag) if flag.leading_only && positional_taken => return ShortCluster::Unknown,
                Some(flag) if flag.takes_value => {
                    let rest = &cluster[idx + c.len_utf8()..];
                    return if rest.is_empty() {
                        ShortCluster::NeedsValue
                    } else {
                        ShortCluster::Complete
                    };
                }
                Some(_) => {}
            }
        }
        ShortCluster::Complete
    }
}
