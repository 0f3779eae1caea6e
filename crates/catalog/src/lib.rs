//! Repository and service layer for the game catalog.
//!
//! Thin persistence over sqlx: paginated list queries and CRUD for games,
//! editors and categories, plus the two projections the newsletter pipeline
//! consumes (the upcoming-release window and the subscriber list).

pub mod categories;
pub mod editors;
pub mod games;
pub mod releases;
pub mod subscribers;
