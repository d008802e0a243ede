pub mod in_memory;
pub mod tims_run;

pub use in_memory::InMemoryRun;
pub use tims_run::read_tims_run;

use crate::errors::{Result, UnsupportedDataError};
use std::path::Path;
use tracing::info;

/// Loads a run from disk, picking the reader from the path.
///
/// `.d` directories are read as Bruker timsTOF data, `.json` and `.msgpack`
/// files as a serialized [`InMemoryRun`]. The run is renamed to `name` so it
/// matches the column of the feature table it belongs to.
pub fn load_run(name: &str, path: &str) -> Result<InMemoryRun> {
    let extension = Path::new(path)
        .extension()
        .and_then(|x| x.to_str())
        .map(|x| x.to_ascii_lowercase());

    let run = match extension.as_deref() {
        Some("d") => read_tims_run(name, path)?,
        Some("json") => {
            info!("Reading serialized run {} from {}", name, path);
            let run: InMemoryRun = serde_json::from_reader(std::io::BufReader::new(
                std::fs::File::open(path)?,
            ))?;
            run
        }
        Some("msgpack") => {
            info!("Reading serialized run {} from {}", name, path);
            let run: InMemoryRun = rmp_serde::from_read(std::io::BufReader::new(
                std::fs::File::open(path)?,
            ))?;
            run
        }
        _ => {
            return Err(UnsupportedDataError::UnknownRunFormat {
                path: path.to_string(),
            }
            .into())
        }
    };

    Ok(run.renamed(name))
}
