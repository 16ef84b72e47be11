//! The fixed catalog of cities every collection job walks through.

use std::sync::Arc;

use crate::error::CatalogError;
use crate::model::CityId;

/// OpenWeather city ids collected by every job, in collection order.
pub const CITY_IDS: [CityId; 167] = [
    3439525, 3439781, 3440645, 3442098, 3442778, 3443341, 3442233, 3440781,
    3441572, 3441575, 3443207, 3442146, 3442007, 3441665, 3441684, 3443061,
    3442584, 3442720, 3443411, 3440054, 3441354, 3442057, 3442585, 3442727,
    3439705, 3441890, 3443173, 3441702, 3442050, 3442754, 3443280, 3440963,
    3443758, 3443756, 3443737, 3443413, 3442180, 3440639, 3440571, 3440771,
    3440777, 3441243, 3442767, 3440696, 3440789, 3440555, 3440833, 3440714,
    3441242, 3442313, 3442398, 3442587, 3442713, 3443030, 3443152, 3440879,
    3441011, 3441292, 3441373, 3441478, 3441686, 3441894, 3442039, 3442051,
    3442138, 3442301, 3442470, 3442568, 3442680, 3442796, 3442803, 3442805,
    3442918, 3443015, 3443198, 3443242, 3443327, 3443352, 3443483, 3443533,
    3443631, 3443643, 3443652, 3439650, 3439728, 3439748, 3439804, 3439886,
    3439930, 3440020, 3440076, 3440081, 3440131, 3440200, 3440240, 3440358,
    3440434, 3440517, 3440554, 3440580, 3440684, 3440747, 3440820, 3440922,
    3440940, 3441012, 3441074, 3441122, 3441186, 3441213, 3441275, 3441338,
    3441421, 3441500, 3441533, 3441626, 3441719, 3441765, 3441803, 3441859,
    3441923, 3441984, 3442083, 3442114, 3442209, 3442266, 3442339, 3442435,
    3442507, 3442630, 3442682, 3442751, 3442845, 3442871, 3442968, 3443070,
    3443106, 3443264, 3443388, 3443449, 3443508, 3443572, 3443690, 3443705,
    3480812, 3480818, 3480823, 3480825, 3480976, 3481006, 3481069, 3481240,
    3481366, 3481428, 3481546, 3481711, 3481829, 3481916, 3482027, 3482121,
    3482210, 3482354, 3482405, 3482502, 3482579, 3482666, 3482741,
];

/// Ordered, duplicate-free list of city ids.
///
/// Cheap to clone; the ids are shared and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    ids: Arc<[CityId]>,
}

impl Catalog {
    /// Build a catalog from an explicit list (used by tests and alternative deployments).
    pub fn new(ids: Vec<CityId>) -> Result<Self, CatalogError> {
        if ids.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (idx, id) in ids.iter().enumerate() {
            if ids[..idx].contains(id) {
                return Err(CatalogError::Duplicate(*id));
            }
        }

        Ok(Self { ids: ids.into() })
    }

    /// Total work size of one collection job.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`: construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[CityId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = CityId> + '_ {
        self.ids.iter().copied()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self { ids: Arc::from(CITY_IDS.as_slice()) }
    }
}
