use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("medicine name must not be empty")]
    BlankName,

    #[error("dosage must not be empty")]
    BlankDosage,

    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FamilyError {
    #[error("family member name must not be empty")]
    BlankName,

    #[error("family member {0:?} already exists")]
    Duplicate(String),
}
