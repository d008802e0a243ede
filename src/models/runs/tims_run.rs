use super::in_memory::InMemoryRun;
use crate::errors::{DataReadingError, Result, UnsupportedDataError};
use crate::models::scans::Scan;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use timsrust::converters::{ConvertableDomain, Tof2MzConverter};
use timsrust::readers::{FrameReader, MetadataReader};
use timsrust::{Frame, MSLevel, TimsRustError};
use tracing::{info, instrument, warn};

/// Collapses the mobility dimension of an MS1 frame into a single spectrum.
///
/// Intensities of the same tof index across mobility scans are summed,
/// the frame index is used as scan id and the frame RT (seconds) as the
/// scan RT.
pub fn frame_to_scan(frame: &Frame, mz_converter: &Tof2MzConverter) -> Scan {
    let mut tof_tree: BTreeMap<u32, u64> = BTreeMap::new();
    for (tof, intensity) in frame.tof_indices.iter().zip(frame.intensities.iter()) {
        let intensity = *intensity as u64;
        tof_tree
            .entry(*tof)
            .and_modify(|curr| *curr += intensity)
            .or_insert(intensity);
    }

    // BTreeMap iterates by tof, which is monotonic in m/z.
    let (mzs, intensities): (Vec<f64>, Vec<f64>) = tof_tree
        .into_iter()
        .map(|(tof, intensity)| (mz_converter.convert(tof as f64), intensity as f64))
        .unzip();

    let ms_level = match frame.ms_level {
        MSLevel::MS1 => 1,
        MSLevel::MS2 => 2,
        _ => 0,
    };

    Scan::from_data_points(
        frame.index,
        frame.rt,
        ms_level,
        mzs.into_iter()
            .zip(intensities)
            .map(crate::models::scans::DataPoint::from),
    )
}

/// Reads all the MS1 frames of a Bruker `.d` directory as an [`InMemoryRun`].
#[instrument(name = "read_tims_run")]
pub fn read_tims_run(name: &str, path: &str) -> Result<InMemoryRun> {
    let st = Instant::now();
    let file_reader =
        FrameReader::new(path).map_err(|e| DataReadingError::TimsRustError(TimsRustError::from(e)))?;

    let sql_path = std::path::Path::new(path).join("analysis.tdf");
    let meta_converters = MetadataReader::new(&sql_path)
        .map_err(|e| DataReadingError::TimsRustError(TimsRustError::from(e)))?;
    let mz_converter = meta_converters.mz_converter;

    let scans: Vec<Scan> = file_reader
        .parallel_filter(|x| x.ms_level == MSLevel::MS1)
        .filter_map(|x| match x {
            Ok(frame) => Some(frame_to_scan(&frame, &mz_converter)),
            Err(e) => {
                warn!("Skipping unreadable frame in {}: {:?}", path, e);
                None
            }
        })
        .collect();

    if scans.is_empty() {
        return Err(UnsupportedDataError::NoMS1DataError {
            path: path.to_string(),
        }
        .into());
    }

    info!(
        "Read {} MS1 frames from {} in {:#?}",
        scans.len(),
        path,
        st.elapsed()
    );
    Ok(InMemoryRun::new(name, scans))
}
