pub const DEFAULT_SOURCE_TABLE: &str = "WATER-USUAGE";
pub const DEFAULT_EXPORT_BUCKET: &str = "exports-thata";
pub const DEFAULT_EXPORT_OBJECT_KEY: &str = "transformed_data/09/04/transformed_data.csv";

pub const SOURCE_TABLE_ENV: &str = "SOURCE_TABLE_NAME";
pub const EXPORT_BUCKET_ENV: &str = "EXPORT_BUCKET";
pub const EXPORT_OBJECT_KEY_ENV: &str = "EXPORT_OBJECT_KEY";

/// Where the export reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub table_name: String,
    pub bucket: String,
    pub object_key: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_SOURCE_TABLE.to_string(),
            bucket: DEFAULT_EXPORT_BUCKET.to_string(),
            object_key: DEFAULT_EXPORT_OBJECT_KEY.to_string(),
        }
    }
}

impl ExportConfig {
    /// Resolves each setting through `lookup`, falling back to the default
    /// when the variable is unset or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |name: &str, default: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            table_name: resolve(SOURCE_TABLE_ENV, DEFAULT_SOURCE_TABLE),
            bucket: resolve(EXPORT_BUCKET_ENV, DEFAULT_EXPORT_BUCKET),
            object_key: resolve(EXPORT_OBJECT_KEY_ENV, DEFAULT_EXPORT_OBJECT_KEY),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}
