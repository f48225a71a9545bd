use crate::algebra::*;
use crate::solver::{DefaultSettings, Outcome};

use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

impl<T> DefaultSettings<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Write the settings to `file` as JSON
    pub fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        // sanitize settings to remove values that
        // can't be serialized, i.e. infs
        let mut settings = self.clone();
        sanitize_settings(&mut settings);

        let json = serde_json::to_string(&settings)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Read settings written by [`write_to_file`](Self::write_to_file).
    /// Missing fields take their default values, and the result is
    /// validated.
    pub fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut settings: DefaultSettings<T> = serde_json::from_str(&buffer)?;

        // restore sanitized settings to their (likely) original values
        desanitize_settings(&mut settings);

        settings
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(settings)
    }
}

impl<T> Outcome<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Write the outcome to `file` as JSON
    pub fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let json = serde_json::to_string(self)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

fn sanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::INFINITY {
        settings.time_limit = f64::MAX;
    }
}

fn desanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::MAX {
        settings.time_limit = f64::INFINITY;
    }
}

#[test]
fn test_json_settings_io() {
    use std::io::{Seek, SeekFrom};

    let settings = crate::solver::DefaultSettingsBuilder::<f64>::default()
        .max_iter(42)
        .eps(1e-7)
        .verbose(false)
        .build()
        .unwrap();
    assert!(settings.time_limit.is_infinite());

    let mut file = tempfile::tempfile().unwrap();
    settings.write_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let settings2 = DefaultSettings::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(settings, settings2);
}

#[test]
fn test_json_partial_and_invalid() {
    use std::io::{Seek, SeekFrom};

    // missing fields take defaults
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(br#"{"tol": 1e-4}"#).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let settings = DefaultSettings::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(settings.tol, 1e-4);
    assert_eq!(settings.max_iter, DefaultSettings::<f64>::default().max_iter);

    // out of range values are rejected
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(br#"{"kappa_mu": 2.0}"#).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let err = DefaultSettings::<f64>::read_from_file(&mut file).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}
