//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own token decoding, session transitions and outbound
//! calls so route handlers can stay focused on cookies, redirects and
//! rendering.

pub mod auth;
pub mod backend;
pub mod oauth;
pub mod session;
pub mod token;
pub mod verify;
