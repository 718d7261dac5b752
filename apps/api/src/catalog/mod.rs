// Catalog management: entry forms, listing, deletes and reset.
// Generation only ever reads these tables.

pub mod handlers;
pub mod queries;
