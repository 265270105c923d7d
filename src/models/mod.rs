pub mod category;
pub mod credential;
pub mod envelope;
pub mod product;
pub mod user;

pub use category::{Category, CategoryPatch, NewCategory};
pub use credential::{CredentialRecord, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
pub use envelope::{Envelope, Page, PaginationMeta};
pub use product::{CategoryRef, Product, StockStatus};
pub use user::{NewUser, User, UserPatch, UserProfile, UserRole, UserStatus};
