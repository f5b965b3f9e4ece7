use crate::ast::Document;

/// Sequential revision-id generator, one per document.
///
/// Ids are rendered as decimal strings, the form the markup vocabulary
/// expects. The counter is strictly monotonic, so every id minted for a
/// document is unique; seeding past the ids already present keeps that
/// guarantee across load/save cycles.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Generator positioned past every revision id in `doc`
    pub fn seeded_from(doc: &Document) -> Self {
        Self {
            next: doc.max_revision_id().map_or(1, |max| max + 1),
        }
    }

    /// Mint the next id
    pub fn new_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        id.to_string()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
