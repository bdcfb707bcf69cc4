/// A collapsed region: `header` stays visible, `header + 1 ..= last` are hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldRegion {
    pub header: usize,
    pub last: usize,
}

impl FoldRegion {
    pub fn new(header: usize, last: usize) -> Self {
        Self { header, last }
    }

    /// Regions sharing at least one line (header included).
    pub fn touches(&self, other: &FoldRegion) -> bool {
        self.header <= other.last && other.header <= self.last
    }

    pub fn union(&self, other: &FoldRegion) -> FoldRegion {
        FoldRegion {
            header: self.header.min(other.header),
            last: self.last.max(other.last),
        }
    }
}
