pub mod categories;
pub mod products;
pub mod query;
pub mod users;

pub use categories::CategoriesService;
pub use products::ProductsService;
pub use query::{
    CategoryQuery, ListQuery, Pagination, ProductQuery, SortOrder, SortState, UserQuery,
    DEFAULT_LIMIT, DEFAULT_PAGE,
};
pub use users::UsersService;
