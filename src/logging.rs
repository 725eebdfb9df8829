use std::fs::{self, OpenOptions};
use std::path::Path;

const LOG_ENV: &str = "FOCUSX_LOG";

/// Route `log` records to a file. The terminal belongs to the UI, so nothing goes to stderr.
///
/// Level comes from `FOCUSX_LOG` (env_logger filter syntax), `info` by default.
/// Failing to open the file leaves logging disabled.
pub fn init(path: &Path) {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return,
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
}
