use crate::models::{CanonicalItem, PairKey};

/// One unordered pair of selected items. `first` sorts before `second` in
/// display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPair {
    pub key: PairKey,
    pub first: CanonicalItem,
    pub second: CanonicalItem,
}

/// Display order used for matrix axes and pair iteration: case-insensitive
/// display name, then id.
pub fn display_order(items: &[CanonicalItem]) -> Vec<&CanonicalItem> {
    let mut sorted: Vec<&CanonicalItem> = items.iter().collect();
    sorted.sort_by(|a, b| {
        a.display
            .to_lowercase()
            .cmp(&b.display.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted
}

/// All unordered 2-combinations of `items`, deterministically ordered.
///
/// The result depends only on the set of items, never on the order they were
/// added in.
pub fn build_pairs(items: &[CanonicalItem]) -> Vec<ItemPair> {
    let sorted = display_order(items);
    let mut pairs = Vec::with_capacity(sorted.len() * sorted.len().saturating_sub(1) / 2);

    for (i, first) in sorted.iter().enumerate() {
        for second in &sorted[i + 1..] {
            pairs.push(ItemPair {
                key: PairKey::new(&first.id, &second.id),
                first: (*first).clone(),
                second: (*second).clone(),
            });
        }
    }

    pairs
}

pub fn pair_keys(pairs: &[ItemPair]) -> Vec<PairKey> {
    pairs.iter().map(|pair| pair.key.clone()).collect()
}
