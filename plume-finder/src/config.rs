use anyhow::{Context, Result, bail};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Parameter overrides read from a JSON object, e.g.
/// `{ "bg_sd_window": 120, "plume_buffer": 5 }`.
#[derive(Debug, Default, Clone)]
pub(crate) struct ParameterFile(Map<String, Value>);

impl ParameterFile {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str(text)? {
            Value::Object(map) => Ok(Self(map)),
            other => bail!("Expected a JSON object of parameters, found {other}"),
        }
    }

    /// Replaces every field of `parameters` named in the file.
    /// Fields the file does not name keep their command line values.
    pub(crate) fn apply<T: Serialize + DeserializeOwned>(&self, parameters: T) -> Result<T> {
        let mut value = serde_json::to_value(parameters)?;
        if let Value::Object(fields) = &mut value {
            for (key, field) in fields.iter_mut() {
                if let Some(replacement) = self.0.get(key) {
                    debug!("Parameter {key} set to {replacement} from file");
                    *field = replacement.clone();
                }
            }
        }
        serde_json::from_value(value).context("applying parameter file")
    }

    /// Keys which match no field of any of the given parameter sets.
    pub(crate) fn unused_keys<'a>(&'a self, used: &[Value]) -> Vec<&'a str> {
        self.0
            .keys()
            .filter(|key| {
                !used
                    .iter()
                    .any(|value| value.as_object().is_some_and(|fields| fields.contains_key(*key)))
            })
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_detection::parameters::{BackgroundParameters, MergeParameters, WaveletParameters};

    #[test]
    fn overrides_named_fields_only() {
        let file = ParameterFile::parse(r#"{ "bg_mean_window": 300, "plume_buffer": 2.5 }"#).unwrap();
        let background = file
            .apply(BackgroundParameters {
                sd_window: 60,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(background.mean_window, 300);
        assert_eq!(background.sd_window, 60);
        assert_eq!(file.apply(MergeParameters::default()).unwrap().buffer_seconds, 2.5);
    }

    #[test]
    fn levels_from_file() {
        let file = ParameterFile::parse(r#"{ "levels": [4, 5], "interpolate": true }"#).unwrap();
        let wavelet = file.apply(WaveletParameters::default()).unwrap();
        assert_eq!(wavelet.levels, vec![4, 5]);
        assert!(wavelet.interpolate);
    }

    #[test]
    fn wrong_type_rejected() {
        let file = ParameterFile::parse(r#"{ "bg_sd_window": "wide" }"#).unwrap();
        assert!(file.apply(BackgroundParameters::default()).is_err());
    }

    #[test]
    fn not_an_object() {
        assert!(ParameterFile::parse("[1, 2]").is_err());
    }

    #[test]
    fn unknown_keys() {
        let file = ParameterFile::parse(r#"{ "bg_sd_window": 3, "bg_sd_windw": 4 }"#).unwrap();
        let used = [serde_json::to_value(BackgroundParameters::default()).unwrap()];
        assert_eq!(file.unused_keys(&used), vec!["bg_sd_windw"]);
    }
}
