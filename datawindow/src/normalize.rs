use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{Dataset, ItemKey, NormalizedItem};

/// A raw record converted to its UI shape, plus its stable identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized<T> {
    pub key: ItemKey,
    pub data: T,
}

/// Converts raw source records into keyed UI items.
pub trait Normalize {
    type Raw;
    type Item;

    fn normalize(&self, raw: Self::Raw) -> Normalized<Self::Item>;
}

pub type KeyExtractor<TIn> = Arc<dyn Fn(&TIn) -> ItemKey + Send + Sync>;
pub type Mapper<TIn, TOut> = Arc<dyn Fn(TIn) -> TOut + Send + Sync>;

/// A [`Normalize`] implementation built from a key extractor and an optional mapper.
///
/// Two distinct raw records yielding the same key are not detected: the one merged last wins.
pub struct Normalizer<TIn, TOut = TIn> {
    key_extractor: KeyExtractor<TIn>,
    mapper: Mapper<TIn, TOut>,
}

impl<TIn, TOut> Clone for Normalizer<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            key_extractor: Arc::clone(&self.key_extractor),
            mapper: Arc::clone(&self.mapper),
        }
    }
}

impl<T: 'static> Normalizer<T, T> {
    /// Keeps raw records as they are; only extracts the key.
    pub fn new<K: ToString>(key_extractor: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        Self::with_mapper(key_extractor, |raw| raw)
    }
}

impl<TIn: 'static, TOut: 'static> Normalizer<TIn, TOut> {
    pub fn with_mapper<K: ToString>(
        key_extractor: impl Fn(&TIn) -> K + Send + Sync + 'static,
        mapper: impl Fn(TIn) -> TOut + Send + Sync + 'static,
    ) -> Self {
        Self {
            key_extractor: Arc::new(move |raw: &TIn| -> ItemKey {
                Arc::from(key_extractor(raw).to_string())
            }),
            mapper: Arc::new(mapper),
        }
    }

    pub fn key_of(&self, raw: &TIn) -> ItemKey {
        (self.key_extractor)(raw)
    }
}

impl<TIn, TOut> Normalize for Normalizer<TIn, TOut> {
    type Raw = TIn;
    type Item = TOut;

    fn normalize(&self, raw: TIn) -> Normalized<TOut> {
        let key = (self.key_extractor)(&raw);
        Normalized {
            key,
            data: (self.mapper)(raw),
        }
    }
}

impl<TIn, TOut> core::fmt::Debug for Normalizer<TIn, TOut> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

/// Merges a page of raw records fetched at `offset` into a new snapshot of `dataset`.
///
/// - Items whose key already existed keep their `selected` flag and layout hints.
/// - `new_total_count` overrides the known total; when neither is known and fewer records than
///   `requested_length` came back, the total is inferred as `offset + returned`.
/// - The order sequence is trimmed to the total count.
///
/// `dataset` itself is left untouched.
pub fn merge_items<N>(
    dataset: &Dataset<N::Item>,
    raw_items: impl IntoIterator<Item = N::Raw>,
    offset: usize,
    normalizer: &N,
    new_total_count: Option<usize>,
    requested_length: Option<usize>,
) -> Dataset<N::Item>
where
    N: Normalize + ?Sized,
{
    let mut items = dataset.items().clone();
    let mut order: Vec<Option<ItemKey>> = dataset.order().to_vec();
    let mut returned = 0usize;

    for (i, raw) in raw_items.into_iter().enumerate() {
        let Normalized { key, data } = normalizer.normalize(raw);
        let index = offset + i;
        let (selected, layout) = items
            .get(&key)
            .map_or((false, None), |prev| (prev.selected, prev.layout));

        items.insert(
            Arc::clone(&key),
            NormalizedItem {
                key: Arc::clone(&key),
                data: Arc::new(data),
                selected,
                is_skeleton: false,
                layout,
            },
        );

        if index >= order.len() {
            order.resize(index + 1, None);
        }
        order[index] = Some(key);
        returned += 1;
    }

    let mut total = new_total_count.or(dataset.total_count());
    if total.is_none() && requested_length.is_some_and(|requested| returned < requested) {
        total = Some(offset + returned);
    }
    if let Some(total) = total {
        order.truncate(total);
    }

    vtrace!(
        offset,
        returned,
        total = ?total,
        len = order.len(),
        "merge_items"
    );

    Dataset::from_parts(dataset, Arc::new(items), Arc::new(order), total)
}

impl<T> Dataset<T> {
    /// A fully loaded collection keyed through `normalizer`.
    pub fn from_normalized<N>(normalizer: &N, raw_items: impl IntoIterator<Item = N::Raw>) -> Self
    where
        N: Normalize<Item = T> + ?Sized,
    {
        let raw: Vec<N::Raw> = raw_items.into_iter().collect();
        let total = raw.len();
        merge_items(&Dataset::new(), raw, 0, normalizer, Some(total), None)
    }
}
