pub const LABEL_ATTRIBUTE: &str = "DATA:";
pub const TIME_ATTRIBUTE: &str = "TIME";
pub const CONSUMPTION_RAW_ATTRIBUTE: &str = "CONSUMPTION_raw";

/// Binary payload of a meter record as it came out of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBlob {
    Bytes(Vec<u8>),
    /// The attribute was present but could not be read as bytes.
    Undecodable,
}

impl Default for RawBlob {
    fn default() -> Self {
        Self::Bytes(Vec::new())
    }
}

impl From<Vec<u8>> for RawBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for RawBlob {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// One entry of the source table.
///
/// Missing attributes are represented by their empty defaults so that a
/// sparse item still produces an export row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeterRecord {
    pub label: String,
    /// Raw decimal text of the numeric `TIME` attribute. Not exported.
    pub time: String,
    pub consumption_raw: RawBlob,
}

impl MeterRecord {
    pub fn new(
        label: impl Into<String>,
        time: impl Into<String>,
        consumption_raw: impl Into<RawBlob>,
    ) -> Self {
        Self {
            label: label.into(),
            time: time.into(),
            consumption_raw: consumption_raw.into(),
        }
    }
}
