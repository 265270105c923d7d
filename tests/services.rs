mod common;

use mockito::{Matcher, Server};
use nexus_admin::models::{
    CategoryPatch, NewCategory, NewUser, StockStatus, UserPatch, UserRole, UserStatus,
};
use nexus_admin::services::{ListQuery, ProductQuery, SortOrder, SortState, UserQuery};

use common::signed_in;

const USER_JSON: &str = r#"{
    "id": "u2",
    "fullName": "Grace Hopper",
    "email": "grace@example.com",
    "role": "ADMIN",
    "status": "ACTIVE",
    "createdAt": "2024-05-01T10:00:00Z"
}"#;

const PRODUCT_JSON: &str = r#"{
    "id": "p1",
    "sku": "LAMP-001",
    "name": "Desk lamp",
    "brand": "Lumen",
    "category": { "id": "c1", "name": "Lighting" },
    "basePrice": "49.90",
    "discountPrice": "39.90",
    "stockUnits": 4,
    "status": "LOW STOCK",
    "isFeatured": true,
    "createdAt": "2024-05-01T10:00:00Z"
}"#;

const CATEGORY_JSON: &str = r#"{
    "id": "c1",
    "name": "Lighting",
    "description": "Lamps and bulbs",
    "productCount": 12,
    "createdAt": "2024-05-01T10:00:00Z",
    "updatedAt": "2024-05-02T10:00:00Z"
}"#;

fn data(json: &str) -> String {
    format!(r#"{{"success":true,"data":{}}}"#, json)
}

fn page(item: &str, page: u32, total_pages: u32) -> String {
    data(&format!(
        r#"{{"items":[{}],"meta":{{"page":{},"totalPages":{},"limit":10,"total":1}}}}"#,
        item, page, total_pages
    ))
}

#[tokio::test]
async fn test_users_list_sends_filters_and_no_cache() {
    let mut server = Server::new_async().await;
    let (state, _) = signed_in(&mut server).await;

    let m = server
        .mock("GET", "/users")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
            Matcher::UrlEncoded("search".into(), "grace".into()),
            Matcher::UrlEncoded("sortBy".into(), "createdAt".into()),
            Matcher::UrlEncoded("sortOrder".into(), "DESC".into()),
            Matcher::UrlEncoded("role".into(), "ADMIN".into()),
        ]))
        .match_header("authorization", "Bearer a1")
        .match_header("cache-control", "no-cache")
        .match_header("pragma", "no-cache")
        .match_header("x-correlation-id", Matcher::Any)
        .with_status(200)
        .with_body(page(USER_JSON, 2, 3))
        .expect(1)
        .create_async()
        .await;

    let query = UserQuery {
        list: ListQuery::page(2, 20)
            .with_search(Some("grace".into()))
            .with_sort(SortState::by("createdAt", SortOrder::Desc)),
        role: Some(UserRole::Admin),
        status: None,
    };
    let result = state.users.list(&query).await.unwrap();
    m.assert_async().await;

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].full_name, "Grace Hopper");
    assert_eq!(result.items[0].status, UserStatus::Active);
    assert!(result.meta.has_next());
}

#[tokio::test]
async fn test_users_create_update_delete() {
    let mut server = Server::new_async().await;
    let (state, _) = signed_in(&mut server).await;

    let create = server
        .mock("POST", "/users")
        .match_body(Matcher::Json(serde_json::json!({
            "fullName": "Grace Hopper",
            "email": "grace@example.com",
            "password": "hunter22",
            "role": "ADMIN",
            "status": "ACTIVE"
        })))
        .with_status(201)
        .with_body(data(USER_JSON))
        .create_async()
        .await;
    let update = server
        .mock("PATCH", "/users/u2")
        .match_body(Matcher::Json(serde_json::json!({ "status": "INACTIVE" })))
        .with_status(200)
        .with_body(data(&USER_JSON.replace("ACTIVE", "INACTIVE")))
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/users/u2")
        .with_status(200)
        .with_body(r#"{"success":true,"message":"User deleted"}"#)
        .create_async()
        .await;

    let created = state
        .users
        .create(&NewUser {
            full_name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            password: "hunter22".into(),
            role: UserRole::Admin,
            status: UserStatus::Active,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "u2");

    let updated = state
        .users
        .update(
            "u2",
            &UserPatch {
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, UserStatus::Inactive);

    state.users.delete("u2").await.unwrap();

    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_users_create_conflict_is_propagated() {
    let mut server = Server::new_async().await;
    let (state, history) = signed_in(&mut server).await;

    server
        .mock("POST", "/users")
        .with_status(409)
        .with_body(r#"{"success":false,"message":"Email already in use"}"#)
        .create_async()
        .await;

    let err = state
        .users
        .create(&NewUser {
            full_name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            password: "hunter22".into(),
            role: UserRole::Admin,
            status: UserStatus::Active,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.api_error().payload_message(), Some("Email already in use"));
    assert!(history.visited().is_empty());
}

#[tokio::test]
async fn test_products_list_and_get() {
    let mut server = Server::new_async().await;
    let (state, _) = signed_in(&mut server).await;

    let list = server
        .mock("GET", "/products")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("categories".into(), "c1,c2".into()),
            Matcher::UrlEncoded("status".into(), "LOW STOCK".into()),
            Matcher::UrlEncoded("promotion".into(), "true".into()),
        ]))
        .match_header("cache-control", "no-cache")
        .with_status(200)
        .with_body(page(PRODUCT_JSON, 1, 1))
        .create_async()
        .await;
    let get = server
        .mock("GET", "/products/p1")
        .with_status(200)
        .with_body(data(PRODUCT_JSON))
        .create_async()
        .await;

    let query = ProductQuery {
        categories: vec!["c1".into(), "c2".into()],
        status: Some(StockStatus::LowStock),
        promotion: Some(true),
        ..Default::default()
    };
    let result = state.products.list(&query).await.unwrap();
    assert_eq!(result.items[0].sku, "LAMP-001");
    assert_eq!(result.items[0].status, StockStatus::LowStock);
    assert!(!result.meta.has_next());

    let product = state.products.get("p1").await.unwrap();
    assert_eq!(product.category.name, "Lighting");
    assert_eq!(product.discount_price.as_deref(), Some("39.90"));

    list.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn test_products_delete() {
    let mut server = Server::new_async().await;
    let (state, _) = signed_in(&mut server).await;

    let delete = server
        .mock("DELETE", "/products/p1")
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(r#"{"success":true,"message":"Product deleted"}"#)
        .expect(1)
        .create_async()
        .await;
    let missing = server
        .mock("DELETE", "/products/nope")
        .with_status(200)
        .with_body(r#"{"success":false,"message":"Product not found"}"#)
        .create_async()
        .await;

    state.products.delete("p1").await.unwrap();
    assert!(state.products.delete("nope").await.is_err());

    delete.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn test_categories_crud_uses_put() {
    let mut server = Server::new_async().await;
    let (state, _) = signed_in(&mut server).await;

    let list = server
        .mock("GET", "/categories")
        .match_query(Matcher::UrlEncoded("search".into(), "light".into()))
        .with_status(200)
        .with_body(page(CATEGORY_JSON, 1, 1))
        .create_async()
        .await;
    let create = server
        .mock("POST", "/categories")
        .match_body(Matcher::Json(serde_json::json!({ "name": "Lighting" })))
        .with_status(201)
        .with_body(data(CATEGORY_JSON))
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/categories/c1")
        .match_body(Matcher::Json(serde_json::json!({ "description": "Lamps" })))
        .with_status(200)
        .with_body(data(CATEGORY_JSON))
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/categories/c1")
        .with_status(204)
        .create_async()
        .await;

    let result = state
        .categories
        .list(&ListQuery::default().with_search(Some("light".into())))
        .await
        .unwrap();
    assert_eq!(result.items[0].product_count, 12);

    state
        .categories
        .create(&NewCategory {
            name: "Lighting".into(),
            description: None,
        })
        .await
        .unwrap();
    state
        .categories
        .update(
            "c1",
            &CategoryPatch {
                name: None,
                description: Some("Lamps".into()),
            },
        )
        .await
        .unwrap();
    state.categories.delete("c1").await.unwrap();

    list.assert_async().await;
    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_envelope_failure_is_rejected() {
    let mut server = Server::new_async().await;
    let (state, _) = signed_in(&mut server).await;

    server
        .mock("DELETE", "/categories/c1")
        .with_status(200)
        .with_body(r#"{"success":false,"message":"Category has products"}"#)
        .create_async()
        .await;

    let err = state.categories.delete("c1").await.unwrap_err();
    assert_eq!(err.api_error().payload_message(), Some("Category has products"));
    assert_eq!(err.status(), None);
}
