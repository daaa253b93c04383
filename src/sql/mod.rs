//! Safe SQL text: identifiers come from the static catalog only, values are
//! always bound parameters with an explicit server-side cast.

mod builder;
mod params;

pub use builder::{
    count, delete, insert, select_by_id, select_page, update, QueryBuf, SearchFilter,
};
pub use params::PgBindValue;
