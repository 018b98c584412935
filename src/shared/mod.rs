pub mod migrate;
pub mod table;
