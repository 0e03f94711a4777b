pub mod entry_crud;
pub mod entry_query;
pub mod feedback;
pub mod fts;
pub mod relations;
pub mod scopes;
pub mod tags;
