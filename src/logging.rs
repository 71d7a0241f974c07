use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Route `log` output to `path`; the terminal belongs to the TUI.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_file_logger<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(io::Error::other)?;

    log::info!("strikemark {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
