use log::LevelFilter;
use std::env;
use std::io::Write;

/// Level for this crate: `debug` with `--verbose`, `warn` otherwise.
#[must_use]
pub const fn level_for(verbose: bool) -> LevelFilter {
  if verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Warn
  }
}

/// Level forced on this crate on top of `RUST_LOG`, if any.
///
/// `--verbose` always wins. Without it, an explicit `RUST_LOG` is left alone.
#[must_use]
pub const fn crate_override(
  verbose: bool,
  rust_log_set: bool,
) -> Option<LevelFilter> {
  if verbose || !rust_log_set {
    Some(level_for(verbose))
  } else {
    None
  }
}

/// Initializes `env_logger` on stderr.
///
/// HTTP internals stay at `warn` unless `RUST_LOG` says otherwise. Calling
/// this twice is harmless.
pub fn init(verbose: bool) {
  let rust_log_set = env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();
  let mut builder = env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("warn"),
  );
  if let Some(level) = crate_override(verbose, rust_log_set) {
    builder.filter_module(env!("CARGO_CRATE_NAME"), level);
  }
  builder.format(|buf, record| {
    writeln!(
      buf,
      "[{} {}] {}",
      record.level(),
      record.target(),
      record.args()
    )
  });

  // Tests may initialize more than once.
  let _ = builder.try_init();
}
