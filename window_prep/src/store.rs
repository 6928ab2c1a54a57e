//! Reading and writing prepared tensors (`.npy`) and metadata (`meta.json`)

use crate::error::{PrepError, Result};
use crate::meta::ForecastMeta;
use crate::prepare::PreparedDataset;
use crate::window::WindowedSamples;
use ndarray::{Array2, Array3};
use ndarray_npy::{read_npy, write_npy};
use std::fs;
use std::path::Path;

/// File name of the metadata document
pub const META_FILE: &str = "meta.json";

const PARTITIONS: [&str; 3] = ["train", "val", "test"];

/// Tensors and metadata read back from disk
#[derive(Debug, Clone)]
pub struct StoredDataset {
    pub train: WindowedSamples,
    pub val: WindowedSamples,
    pub test: WindowedSamples,
    pub meta: ForecastMeta,
}

fn write_partition(dir: &Path, name: &str, samples: &WindowedSamples) -> Result<()> {
    write_npy(dir.join(format!("X_{}.npy", name)), &samples.inputs)?;
    write_npy(dir.join(format!("y_{}.npy", name)), &samples.targets)?;
    Ok(())
}

fn read_partition(dir: &Path, name: &str, meta: &ForecastMeta) -> Result<WindowedSamples> {
    let inputs: Array3<f64> = read_npy(dir.join(format!("X_{}.npy", name)))?;
    let targets: Array2<f64> = read_npy(dir.join(format!("y_{}.npy", name)))?;

    let shape = inputs.shape();
    if shape[1] != meta.window || shape[2] != meta.num_features {
        return Err(PrepError::DataError(format!(
            "X_{} has shape {:?}, expected (n, {}, {})",
            name, shape, meta.window, meta.num_features
        )));
    }
    if targets.nrows() != shape[0] || targets.ncols() != meta.horizon {
        return Err(PrepError::DataError(format!(
            "y_{} has shape {:?}, expected ({}, {})",
            name,
            targets.shape(),
            shape[0],
            meta.horizon
        )));
    }

    Ok(WindowedSamples { inputs, targets })
}

/// Write `X_{part}.npy`, `y_{part}.npy` for each partition plus `meta.json`
pub fn save_dataset<P: AsRef<Path>>(dir: P, dataset: &PreparedDataset) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let partitions = [&dataset.train, &dataset.val, &dataset.test];
    for (name, samples) in PARTITIONS.iter().zip(partitions) {
        write_partition(dir, name, samples)?;
    }
    fs::write(dir.join(META_FILE), dataset.meta.to_json()?)?;

    tracing::info!(dir = %dir.display(), "saved prepared dataset");
    Ok(())
}

/// Read only the metadata document
pub fn load_meta<P: AsRef<Path>>(dir: P) -> Result<ForecastMeta> {
    let raw = fs::read_to_string(dir.as_ref().join(META_FILE))?;
    ForecastMeta::from_json(&raw)
}

/// Read all partitions and the metadata, checking shapes against the metadata
pub fn load_dataset<P: AsRef<Path>>(dir: P) -> Result<StoredDataset> {
    let dir = dir.as_ref();
    let meta = load_meta(dir)?;
    let train = read_partition(dir, PARTITIONS[0], &meta)?;
    let val = read_partition(dir, PARTITIONS[1], &meta)?;
    let test = read_partition(dir, PARTITIONS[2], &meta)?;

    Ok(StoredDataset {
        train,
        val,
        test,
        meta,
    })
}
