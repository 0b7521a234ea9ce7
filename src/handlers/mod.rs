pub mod pack_handlers;
