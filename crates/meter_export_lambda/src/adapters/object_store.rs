/// Destination for the rendered export. Writes overwrite any existing object
/// at the same key.
pub trait ObjectStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String>;
}
