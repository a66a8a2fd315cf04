#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row_idx: usize,
    pub field: String,
}

/// A cell whose working value differs from the original snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedCell {
    pub row_idx: usize,
    pub field: String,
    pub original_value: String,
    pub new_value: String,
}

impl EditedCell {
    pub fn key(&self) -> CellKey {
        CellKey {
            row_idx: self.row_idx,
            field: self.field.clone(),
        }
    }
}
