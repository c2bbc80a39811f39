//! Authentication and authorization system.
//!
//! # Authentication Methods
//!
//! The system supports two authentication methods:
//!
//! ## 1. Session Authentication
//!
//! Browser-based authentication using secure HTTP-only cookies:
//! - Users log in via `/authentication/login` with email/password
//! - A signed JWT is stored in a secure, HTTP-only cookie
//! - Tokens expire after the configured session lifetime
//!
//! ## 2. Proxy Header Authentication
//!
//! For deployments behind an authenticating reverse proxy, the proxy asserts
//! the user's email in a trusted header. Unknown users can be auto-created
//! with the standard role when enabled.
//!
//! # Authorization
//!
//! Access control is managed through:
//! - **Roles**: Platform-wide permissions (LotManager, BillingManager, StandardUser)
//! - **Ownership**: Users can read and modify their own resources
//! - **Admin flag**: Admins bypass role checks entirely
//!
//! See [`permissions`] for the typed [`permissions::RequiresPermission`]
//! extractor used by the handlers.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: Permission checking and access control logic
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
