//! Locating the SPK kernel on disk, and fetching it from NAIF when the
//! `jpl-download` feature is enabled.
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::{celestial_errors::CelestialError, jpl_ephem::naif::naif_version::NaifVersion};

#[cfg(feature = "jpl-download")]
const NAIF_PLANETS_URL: &str = "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/spk/planets";

/// Directory holding kernels fetched by this crate.
pub fn ephemeris_cache_dir() -> Result<Utf8PathBuf, CelestialError> {
    let base_dir = BaseDirs::new().ok_or_else(|| {
        CelestialError::UnableToCreateBaseDir("no home directory for the cache".to_string())
    })?;
    let cache_path = Utf8Path::from_path(base_dir.cache_dir()).ok_or_else(|| {
        CelestialError::Utf8PathError(format!("{}", base_dir.cache_dir().display()))
    })?;
    Ok(cache_path.join("celestial").join("jpl_ephem"))
}

#[cfg(feature = "jpl-download")]
async fn download_big_file(url: &str, path: &Utf8Path) -> Result<(), CelestialError> {
    use tokio::{fs::File, io::AsyncWriteExt};
    use tokio_stream::StreamExt;

    // write to a side file so a partial download never looks like a kernel
    let partial = path.with_extension("part");
    let mut file = File::create(&partial).await?;
    log::info!("Downloading {url}...");

    let mut stream = reqwest::get(url).await?.error_for_status()?.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    tokio::fs::rename(&partial, path).await?;

    log::info!("Downloaded {url} to {path}");
    Ok(())
}

/// Resolve the configured `ephemeris` entry to a kernel file.
///
/// The entry is first taken as a path. Failing that, a NAIF version name
/// (`de421`, `DE440.bsp`, ...) is looked up in the cache directory and, with the
/// `jpl-download` feature, downloaded there.
pub fn get_ephemeris_file(entry: &str) -> Result<Utf8PathBuf, CelestialError> {
    let path = Utf8Path::new(entry);
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let Ok(version) = entry.parse::<NaifVersion>() else {
        return Err(CelestialError::JPLFileNotFound(entry.to_string()));
    };

    let local_file = ephemeris_cache_dir()?.join(version.get_filename());
    if local_file.is_file() {
        return Ok(local_file);
    }

    #[cfg(feature = "jpl-download")]
    {
        let cache_dir = ephemeris_cache_dir()?;
        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| CelestialError::UnableToCreateBaseDir(format!("{cache_dir}: {e}")))?;

        let url = format!("{NAIF_PLANETS_URL}/{}", version.get_filename());
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(download_big_file(&url, &local_file))?;
        Ok(local_file)
    }

    #[cfg(not(feature = "jpl-download"))]
    {
        Err(CelestialError::JPLFileNotFound(local_file.to_string()))
    }
}

#[cfg(test)]
mod download_jpl_file_test {
    use super::*;

    #[test]
    fn test_existing_path_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("kernel.bsp");
        std::fs::write(&file, b"DAF/SPK ").unwrap();
        let entry = file.to_str().unwrap();
        assert_eq!(get_ephemeris_file(entry).unwrap().as_str(), entry);
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let err = get_ephemeris_file("/nonexistent/dir/kernel.bsp").unwrap_err();
        assert_eq!(
            err,
            CelestialError::JPLFileNotFound("/nonexistent/dir/kernel.bsp".to_string())
        );
        assert!(err.is_not_ready());
    }

    #[test]
    fn test_cache_dir_layout() {
        if let Ok(dir) = ephemeris_cache_dir() {
            assert!(dir.ends_with("celestial/jpl_ephem"));
        }
    }

    #[test]
    #[cfg(feature = "jpl-download")]
    fn test_feature_download_jpl_ephem() {
        let path = get_ephemeris_file("de421").expect("Failed to download JPL ephemeris file");
        assert!(path.is_file());
        assert_eq!(path.file_name(), Some("de421.bsp"));
    }
}
