/// The chain of ancestors above the line being read, one slot per level of
/// indentation. A slot holds the index of the taxon that opened that level,
/// or None if nothing did (a level skipped over, or one opened below a
/// synonym).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Ancestry {
    stack: Vec<Option<usize>>,
}

impl Ancestry {
    pub(crate) fn new() -> Ancestry {
        Ancestry { stack: vec![] }
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack
            .len()
    }

    /// The closest ancestor that is actually a taxon.
    pub(crate) fn nearest(&self) -> Option<usize> {
        self.stack
            .iter()
            .rev()
            .find_map(|slot| *slot)
    }

    /// Open one more level below the current one.
    pub(crate) fn push(&mut self, slot: Option<usize>) {
        self.stack
            .push(slot);
    }

    /// Go back up so that `depth` levels remain.
    pub(crate) fn truncate(&mut self, depth: usize) {
        self.stack
            .truncate(depth);
    }

    pub(crate) fn reset(&mut self) {
        self.stack
            .clear();
    }
}
