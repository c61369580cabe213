//! Persisted plugin order and the display comparator.
//!
//! An [`OrderRecord`] can only be built through validation, so holding one
//! means holding a permutation of [`PluginId::all`]. The comparator works on
//! raw slices instead, because the display has to keep working when it is
//! handed something that is not a valid order.
//!
//! Index lookups are linear scans. Chains hold exactly five plugins, so the
//! scans are cheaper than maintaining a lookup table; nothing here is meant to
//! scale to large N.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::plugin::{PluginId, SlotId};

/// A validated total order over the plugin set.
///
/// Invariants: one entry per plugin, no duplicates, set-equal to
/// [`PluginId::all`]. The pinned sentinel is not a [`PluginId`] and can
/// therefore never be a member.
///
/// Serializes as a plain list of plugin tokens:
///
/// ```toml
/// plugins = ["limiter", "compressor", "filter", "equalizer", "reverb"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<PluginId>", into = "Vec<PluginId>")]
pub struct OrderRecord(Vec<PluginId>);

impl OrderRecord {
    /// Validate and wrap a plugin sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidOrder`] when `plugins` is not a
    /// permutation of the plugin set.
    pub fn new(plugins: Vec<PluginId>) -> Result<Self, ChainError> {
        Self::validate(&plugins)?;
        Ok(Self(plugins))
    }

    /// Parse an order from plugin tokens (e.g. `["reverb", "limiter", ...]`).
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidOrder`] for unknown tokens (including the
    /// sentinel) and for sequences that are not permutations.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ChainError> {
        let plugins = tokens
            .iter()
            .map(|t| {
                let t = t.as_ref();
                t.parse::<PluginId>().map_err(|_| {
                    ChainError::invalid_order(format!("'{}' is not a reorderable plugin", t.trim()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(plugins)
    }

    /// Check that `plugins` is a permutation of [`PluginId::all`].
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidOrder`] describing the first problem found.
    pub fn validate(plugins: &[PluginId]) -> Result<(), ChainError> {
        let all = PluginId::all();
        if plugins.len() != all.len() {
            return Err(ChainError::invalid_order(format!(
                "expected {} plugins, got {}",
                all.len(),
                plugins.len()
            )));
        }
        for (i, id) in plugins.iter().enumerate() {
            if plugins[..i].contains(id) {
                return Err(ChainError::invalid_order(format!("duplicate entry '{id}'")));
            }
        }
        if let Some(missing) = all.iter().find(|id| !plugins.contains(id)) {
            return Err(ChainError::invalid_order(format!("missing entry '{missing}'")));
        }
        Ok(())
    }

    /// Re-run validation on an existing record.
    pub fn check(&self) -> Result<(), ChainError> {
        Self::validate(&self.0)
    }

    /// The plugins in order.
    pub fn as_slice(&self) -> &[PluginId] {
        &self.0
    }

    /// Iterate over the plugins in order.
    pub fn iter(&self) -> impl Iterator<Item = PluginId> + '_ {
        self.0.iter().copied()
    }

    /// Number of entries (always the size of the plugin set).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a valid record.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of `id`, or `None` if absent.
    pub fn position(&self, id: PluginId) -> Option<usize> {
        self.0.iter().position(|&p| p == id)
    }

    /// A copy with the entries at `a` and `b` exchanged.
    ///
    /// Returns `None` if either index is out of range. Swapping preserves the
    /// permutation invariant, so no re-validation is needed.
    pub fn swapped(&self, a: usize, b: usize) -> Option<Self> {
        if a >= self.0.len() || b >= self.0.len() {
            return None;
        }
        let mut plugins = self.0.clone();
        plugins.swap(a, b);
        Some(Self(plugins))
    }

    /// The plugin tokens in order.
    pub fn tokens(&self) -> Vec<&'static str> {
        self.0.iter().map(PluginId::as_str).collect()
    }

    /// Display order of every slot: the sentinel followed by this order.
    pub fn display_slots(&self) -> Vec<SlotId> {
        core::iter::once(SlotId::Applications)
            .chain(self.0.iter().copied().map(SlotId::from))
            .collect()
    }
}

impl Default for OrderRecord {
    /// `[limiter, compressor, filter, equalizer, reverb]`.
    fn default() -> Self {
        Self(PluginId::all().to_vec())
    }
}

impl TryFrom<Vec<PluginId>> for OrderRecord {
    type Error = ChainError;

    fn try_from(plugins: Vec<PluginId>) -> Result<Self, Self::Error> {
        Self::new(plugins)
    }
}

impl From<OrderRecord> for Vec<PluginId> {
    fn from(record: OrderRecord) -> Self {
        record.0
    }
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(", "))
    }
}

/// Sort key of a non-pinned slot within an order.
///
/// `Absent` orders after every `At`, which places entries missing from the
/// order at the end of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    /// Index within the order.
    At(usize),
    /// Not present in the order.
    Absent,
}

/// Rank of `slot` within `order`.
///
/// The sentinel has no rank of its own; callers check
/// [`SlotId::is_pinned`] first, which [`presentation_cmp`] does.
pub fn display_rank(slot: SlotId, order: &[PluginId]) -> Rank {
    slot.plugin()
        .and_then(|id| order.iter().position(|&p| p == id))
        .map_or(Rank::Absent, Rank::At)
}

/// Display comparator for chain rows.
///
/// The pinned sentinel sorts first unconditionally. Two plugins compare by
/// their index in `order`; a plugin missing from `order` ranks after all
/// present ones. Equal ranks compare `Equal`, so a stable sort keeps their
/// insertion order.
pub fn presentation_cmp(a: SlotId, b: SlotId, order: &[PluginId]) -> Ordering {
    match (a.is_pinned(), b.is_pinned()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => display_rank(a, order).cmp(&display_rank(b, order)),
    }
}

/// Stable in-place sort of `slots` by [`presentation_cmp`].
pub fn sort_slots(slots: &mut [SlotId], order: &[PluginId]) {
    slots.sort_by(|&a, &b| presentation_cmp(a, b, order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use PluginId::{Compressor, Equalizer, Filter, Limiter, Reverb};

    #[test]
    fn default_order() {
        let order = OrderRecord::default();
        assert_eq!(
            order.as_slice(),
            &[Limiter, Compressor, Filter, Equalizer, Reverb]
        );
        assert!(order.check().is_ok());
    }

    #[test]
    fn rejects_duplicates() {
        let err = OrderRecord::new(vec![Limiter, Limiter, Filter, Equalizer, Reverb]).unwrap_err();
        assert!(matches!(err, ChainError::InvalidOrder { .. }));
        assert!(err.to_string().contains("duplicate"), "got: {err}");
    }

    #[test]
    fn rejects_short_order() {
        let err = OrderRecord::new(vec![Limiter, Compressor]).unwrap_err();
        assert!(err.to_string().contains("expected 5"), "got: {err}");
    }

    #[test]
    fn parse_rejects_sentinel() {
        let err = OrderRecord::parse(&[
            "applications",
            "compressor",
            "filter",
            "equalizer",
            "reverb",
        ])
        .unwrap_err();
        assert!(matches!(err, ChainError::InvalidOrder { .. }));
        assert!(err.to_string().contains("applications"), "got: {err}");
    }

    #[test]
    fn parse_accepts_permutation() {
        let order =
            OrderRecord::parse(&["reverb", "equalizer", "filter", "compressor", "limiter"]).unwrap();
        assert_eq!(order.position(Reverb), Some(0));
        assert_eq!(order.position(Limiter), Some(4));
        assert_eq!(order.to_string(), "reverb, equalizer, filter, compressor, limiter");
    }

    #[test]
    fn swapped_keeps_original() {
        let order = OrderRecord::default();
        let moved = order.swapped(1, 2).unwrap();
        assert_eq!(moved.as_slice(), &[Limiter, Filter, Compressor, Equalizer, Reverb]);
        assert_eq!(order, OrderRecord::default());
        assert!(order.swapped(4, 5).is_none());
    }

    #[test]
    fn display_slots_start_with_sentinel() {
        let slots = OrderRecord::default().display_slots();
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0], SlotId::Applications);
        assert_eq!(slots[1], SlotId::Plugin(Limiter));
    }

    #[test]
    fn sentinel_sorts_first() {
        let order = [Reverb, Limiter, Compressor, Filter, Equalizer];
        assert_eq!(
            presentation_cmp(SlotId::Applications, SlotId::Plugin(Reverb), &order),
            Ordering::Less
        );
        assert_eq!(
            presentation_cmp(SlotId::Plugin(Reverb), SlotId::Applications, &order),
            Ordering::Greater
        );
        assert_eq!(
            presentation_cmp(SlotId::Applications, SlotId::Applications, &order),
            Ordering::Equal
        );
    }

    #[test]
    fn absent_entries_sort_last_in_insertion_order() {
        // Corrupt order: only two plugins present.
        let order = [Filter, Limiter];
        let mut rows = vec![
            SlotId::Plugin(Reverb),
            SlotId::Plugin(Limiter),
            SlotId::Plugin(Compressor),
            SlotId::Applications,
            SlotId::Plugin(Filter),
        ];
        sort_slots(&mut rows, &order);
        assert_eq!(
            rows,
            vec![
                SlotId::Applications,
                SlotId::Plugin(Filter),
                SlotId::Plugin(Limiter),
                SlotId::Plugin(Reverb),
                SlotId::Plugin(Compressor),
            ]
        );
    }

    #[test]
    fn rank_ordering() {
        assert!(Rank::At(4) < Rank::Absent);
        assert_eq!(display_rank(SlotId::Applications, &[Limiter]), Rank::Absent);
        assert_eq!(display_rank(SlotId::Plugin(Limiter), &[Reverb, Limiter]), Rank::At(1));
    }

    #[test]
    fn serde_rejects_invalid_order() {
        let result: Result<OrderRecord, _> = serde_json::from_str(r#"["limiter","limiter"]"#);
        assert!(result.is_err());
        let ok: OrderRecord = serde_json::from_str(
            r#"["reverb","limiter","compressor","filter","equalizer"]"#,
        )
        .unwrap();
        assert_eq!(ok.position(Reverb), Some(0));
    }
}
