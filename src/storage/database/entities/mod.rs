/// Category permission entity module
pub mod category_permission;
/// Permission entity module
pub mod permission;
/// Role entity module
pub mod role;
/// Role permission entity module
pub mod role_permission;
/// User role entity module
pub mod user_role;

pub use category_permission::Entity as CategoryPermission;
pub use permission::Entity as Permission;
pub use role::Entity as Role;
pub use role_permission::Entity as RolePermission;
pub use user_role::Entity as UserRole;
