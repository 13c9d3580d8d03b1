use std::path::Path;

pub const BUNDLE_MANIFEST_FILE_NAME: &str = ".manifest";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Policy,
    JsonData,
    YamlData,
}

impl SourceKind {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if file_name.ends_with(".rego") {
            return Some(Self::Policy);
        }
        if file_name.ends_with(".json") {
            return Some(Self::JsonData);
        }
        if file_name.ends_with(".yaml") || file_name.ends_with(".yml") {
            return Some(Self::YamlData);
        }
        None
    }

    /// Data documents inside a bundle must be named `data.<ext>`.
    #[must_use]
    pub fn is_bundle_data_file(path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        matches!(file_name, "data.json" | "data.yaml" | "data.yml")
    }
}
