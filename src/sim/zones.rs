/// Ordered reactivation zones over the comms subset.
///
/// Members are sorted by temperature ascending (ties keep member order)
/// and split into contiguous chunks whose sizes differ by at most one, so
/// zone 0 holds the coldest units.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactivationZones {
    zones: Vec<Vec<usize>>,
}

impl ReactivationZones {
    /// Builds `zone_count` zones from `members` using `temperature_of` to rank them.
    ///
    /// # Panics
    ///
    /// Panics if `zone_count` is zero.
    pub fn build(
        members: &[usize],
        zone_count: usize,
        temperature_of: impl Fn(usize) -> f64,
    ) -> Self {
        assert!(zone_count > 0, "zone_count must be > 0");

        let mut ranked: Vec<(usize, f64)> =
            members.iter().map(|&i| (i, temperature_of(i))).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let base = ranked.len() / zone_count;
        let extra = ranked.len() % zone_count;
        let mut zones = Vec::with_capacity(zone_count);
        let mut rest = ranked.as_slice();
        for z in 0..zone_count {
            let size = base + usize::from(z < extra);
            let (chunk, tail) = rest.split_at(size);
            zones.push(chunk.iter().map(|&(i, _)| i).collect());
            rest = tail;
        }

        Self { zones }
    }

    /// Members of zone `index`; empty for an index past the last zone.
    pub fn zone(&self, index: usize) -> &[usize] {
        self.zones.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.zones.iter().map(Vec::as_slice)
    }
}
