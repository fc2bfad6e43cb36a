mod cache;
mod captcha;
mod cart;
mod hashing;
mod order;
mod product;
mod session;
mod user;

pub use self::cache::{CacheStoreTrait, DynCacheStore};
pub use self::captcha::{CaptchaVerifierTrait, DynCaptchaVerifier};
pub use self::cart::{
    CartCommandRepositoryTrait, CartQueryRepositoryTrait, CartServiceTrait,
    DynCartCommandRepository, DynCartQueryRepository, DynCartService,
};
pub use self::hashing::{DynHashing, HashingTrait};
pub use self::order::{
    DynOrderCommandRepository, DynOrderQueryRepository, DynOrderService,
    OrderCommandRepositoryTrait, OrderQueryRepositoryTrait, OrderServiceTrait,
};
pub use self::product::{
    DynProductCommandRepository, DynProductQueryRepository, DynProductService,
    ProductCommandRepositoryTrait, ProductQueryRepositoryTrait, ProductServiceTrait,
};
pub use self::session::{AuthServiceTrait, DynAuthService, DynSessionStore, SessionStoreTrait};
pub use self::user::{
    DynUserCommandRepository, DynUserQueryRepository, DynUserService, UserCommandRepositoryTrait,
    UserQueryRepositoryTrait, UserServiceTrait,
};
