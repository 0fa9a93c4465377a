//! SQL builders bound to a [`Schema`](crate::schema::Schema).

mod create;
mod drop;
mod insert;
mod select;

pub use create::Create;
pub use drop::DropTable;
pub use insert::{Insert, InsertMode};
pub use select::{Direction, Select};
