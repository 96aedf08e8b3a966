use crate::model::LoadError;

#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    /// Reads the whole price list as text.
    async fn fetch(&self) -> Result<String, LoadError>;

    fn describe(&self) -> String;
}
