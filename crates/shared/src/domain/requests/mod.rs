mod auth;
mod product;
mod user;

pub use self::auth::LoginRequest;
pub use self::product::{CreateProductRequest, UpdateProductRequest};
pub use self::user::{
    ChangeEmailRequest, ChangePasswordRequest, ChangeRoleRequest, CreateUserRequest,
    EMAIL_REGEX, RegisterRequest,
};
