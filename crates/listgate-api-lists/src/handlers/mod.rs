//! Request handlers for the list gateway.

mod read;
mod send;

pub use read::{get_from_list, get_site_users};
pub use send::send_to_list;
