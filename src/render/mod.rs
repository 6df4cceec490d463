//! Drawing. Everything here except [`cull`] needs a graphics context.

pub mod cull;
mod draw;

pub use draw::MapRenderer;
