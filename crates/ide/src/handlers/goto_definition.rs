use crate::cascade;
use crate::file_system::{FilePosition, FileRange};
use crate::index::Index;
use crate::variable::Reference;

/// Definitions of the variable under the cursor, winner first. From a usage
/// only the definitions reaching it are listed, unless none do.
pub fn exec(index: &Index, pos: &FilePosition) -> Option<Vec<FileRange>> {
    let reference = index.reference_at(&pos.file, pos.position)?;
    let usage = match reference {
        Reference::Usage(usage) => Some(usage),
        Reference::Definition(_) => None,
    };

    let mut candidates = cascade::explain(index, reference.name(), usage);
    if candidates.is_empty() {
        candidates = cascade::explain(index, reference.name(), None);
    }
    let locations: Vec<_> = candidates
        .iter()
        .map(|candidate| candidate.definition.location())
        .collect();
    (!locations.is_empty()).then_some(locations)
}
