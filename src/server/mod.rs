//! HTTP integration
//!
//! Guards and middleware that put the authorization service in front of
//! actix-web handlers.

pub mod guards;
pub mod middleware;
pub mod state;
pub mod types;


pub use guards::{
    PermissionMode, require_admin, require_category_permission, require_moderator,
    require_permissions, require_role,
};
pub use middleware::{RequirePermission, RequirePermissionService};
pub use state::AppState;
pub use types::{AuthenticatedUser, get_authenticated_user};
