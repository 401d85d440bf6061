// Network adapter modules split by client sockets vs inspection HTTP routes.

pub mod client;
pub mod internal;

pub use client::{spawn_update_serializer, ws_handler};
pub use internal::list_areas_handler;
