use std::sync::{PoisonError, RwLock};

/// Append-only record of drawn numbers, in draw order.
///
/// Appends come from the draw subscription task while renders read from the
/// control path, so reads go through the same lock and hand out copies.
#[derive(Debug, Default)]
pub struct DrawLog {
    numbers: RwLock<Vec<u32>>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, number: u32) {
        self.numbers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(number);
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.numbers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.numbers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, number: u32) -> bool {
        self.numbers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&number)
    }
}
