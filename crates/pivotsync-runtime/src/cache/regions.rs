use super::lock;
use pivotsync_types::{CellRef, Region, TableId};
use std::sync::Mutex;

/// Regions of one table kind known for the active sheet.
///
/// The list is only ever replaced wholesale. Callers publish their own
/// notification after a replacement.
#[derive(Debug, Default)]
pub struct RegionCache {
    regions: Mutex<Vec<Region>>,
}

impl RegionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached list. Regions with inverted bounds are dropped.
    pub fn replace_all(&self, regions: Vec<Region>) {
        let (valid, malformed): (Vec<_>, Vec<_>) =
            regions.into_iter().partition(Region::is_well_formed);
        for region in &malformed {
            log::warn!(
                "dropping malformed region {} ({},{})-({},{})",
                region.id,
                region.start_row,
                region.start_col,
                region.end_row,
                region.end_col
            );
        }
        *lock(&self.regions) = valid;
    }

    /// First region containing `cell`.
    pub fn find_at_cell(&self, cell: CellRef) -> Option<Region> {
        lock(&self.regions)
            .iter()
            .find(|region| region.contains(cell))
            .cloned()
    }

    pub fn get(&self, id: TableId) -> Option<Region> {
        lock(&self.regions).iter().find(|r| r.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Region> {
        lock(&self.regions).clone()
    }

    pub fn clear(&self) {
        lock(&self.regions).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.regions).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.regions).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_at_cell_after_replacements() {
        let cache = RegionCache::new();
        cache.replace_all(vec![Region::new(7, 0, 0, 5, 3), Region::new(8, 10, 0, 12, 2)]);

        assert_eq!(cache.find_at_cell(CellRef::new(2, 2)).map(|r| r.id), Some(7));
        assert_eq!(cache.find_at_cell(CellRef::new(11, 1)).map(|r| r.id), Some(8));
        assert!(cache.find_at_cell(CellRef::new(10, 10)).is_none());

        cache.replace_all(vec![Region::new(9, 2, 2, 3, 3)]);
        assert_eq!(cache.find_at_cell(CellRef::new(2, 2)).map(|r| r.id), Some(9));
        assert!(cache.find_at_cell(CellRef::new(0, 0)).is_none());
        assert!(cache.get(7).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_single_cell_region() {
        let cache = RegionCache::new();
        cache.replace_all(vec![Region::new(1, 4, 4, 4, 4).empty()]);
        assert!(cache.find_at_cell(CellRef::new(4, 4)).is_some());
        assert!(cache.find_at_cell(CellRef::new(4, 5)).is_none());
    }

    #[test]
    fn test_malformed_regions_are_dropped() {
        let cache = RegionCache::new();
        cache.replace_all(vec![Region::new(1, 5, 0, 2, 3), Region::new(2, 0, 0, 1, 1)]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.all()[0].id, 2);
    }

    #[test]
    fn test_clear() {
        let cache = RegionCache::new();
        cache.replace_all(vec![Region::new(1, 0, 0, 1, 1)]);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.find_at_cell(CellRef::new(0, 0)).is_none());
    }
}
