use crate::file_system::{FilePosition, FileRange};
use crate::index::Index;
use crate::variable::Reference;

pub fn exec(index: &Index, pos: &FilePosition, include_declaration: bool) -> Option<Vec<FileRange>> {
    let reference = index.reference_at(&pos.file, pos.position)?;
    let locations = index
        .references(reference.name())
        .iter()
        .filter(|it| include_declaration || matches!(it, Reference::Usage(_)))
        .map(Reference::location)
        .collect();
    Some(locations)
}
