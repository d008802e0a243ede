/// Something that accumulates items one at a time and is then turned
/// into a result.
///
/// The `Item` type is the type of the item that is being aggregated.
/// `add` takes an item of type `Item` OR a type that implements
/// `Into<Item>`.
///
/// `finalize` consumes the aggregator, so every aggregator is finalized
/// at most once.
pub trait Aggregator: Send + Sync {
    type Item: Send + Sync + Clone;
    type Output: Send + Sync;

    fn add(&mut self, item: impl Into<Self::Item>);
    fn finalize(self) -> Self::Output;

    fn add_all<T: Into<Self::Item>>(&mut self, items: impl IntoIterator<Item = T>)
    where
        Self: Sized,
    {
        for item in items {
            self.add(item);
        }
    }
}
