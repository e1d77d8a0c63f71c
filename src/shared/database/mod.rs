pub mod connection;
pub mod guards;
pub mod migrations;
pub mod rows;

pub use connection::{begin_immediate, configure, initialize_database, open_in_memory, store_error};
pub use guards::{ensure_not_referenced, ensure_unique, Dependent};
pub use migrations::{run_migrations, Migration, MigrationSummary, MIGRATIONS};
pub use rows::{delete_row, ensure_affected, fetch_all, fetch_one, verify_stored};
