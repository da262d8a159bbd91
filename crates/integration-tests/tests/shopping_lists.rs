//! Shopping list endpoints over the in-memory repository.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    http::{Method, StatusCode},
};
use bestcart_api::db::InMemoryRepository;
use bestcart_api::models::Product;
use bestcart_core::ProductId;
use bestcart_integration_tests::{get_json, grocery, send_json, test_app};
use chrono::Utc;
use serde_json::{Value, json};

fn product(id: i32, name: &str, department: Option<&str>, units: Option<&str>) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: Some(format!("{name} description")),
        manufacturer: None,
        canonical_department: department.map(str::to_owned),
        default_units: units.map(str::to_owned),
        created_at: now,
        updated_at: now,
    }
}

/// Grocery data plus products with and without department and units.
fn pantry() -> InMemoryRepository {
    grocery()
        .with_catalog_product(product(20, "Cheddar", Some("Dairy"), Some("block")))
        .with_catalog_product(product(21, "Apples", Some("Produce"), Some("lb")))
        .with_catalog_product(product(22, "Batteries", None, None))
}

async fn create_list(app: &Router, user_id: i32, body: Value) -> Value {
    let (status, response) = send_json(
        app.clone(),
        Method::POST,
        &format!("/shopping-lists?userId={user_id}"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{response}");
    response["data"].clone()
}

async fn add_product(app: &Router, list_id: &Value, body: Value) -> (StatusCode, Value) {
    send_json(
        app.clone(),
        Method::POST,
        &format!("/shopping-lists/{list_id}/items?userId=1"),
        Some(body),
    )
    .await
}

// =============================================================================
// Lists
// =============================================================================

#[tokio::test]
async fn test_create_and_show_list() {
    let app = test_app(grocery());
    let (status, body) = send_json(
        app.clone(),
        Method::POST,
        "/shopping-lists?userId=1",
        Some(json!({"name": " Weekly ", "description": "Saturday shop"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "List created successfully");
    let list = &body["data"];
    assert_eq!(list["name"], "Weekly");
    assert_eq!(list["description"], "Saturday shop");
    assert_eq!(list["is_template"], false);
    assert_eq!(list["user_id"], 1);

    let (status, shown) =
        get_json(app, &format!("/shopping-lists/{}?userId=1", list["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&shown, list);
}

#[tokio::test]
async fn test_index_excludes_templates_and_other_users() {
    let app = test_app(grocery());
    create_list(&app, 1, json!({"name": "Weekly"})).await;
    create_list(&app, 1, json!({"name": "Party", "is_template": true})).await;
    create_list(&app, 2, json!({"name": "Bob's list"})).await;
    create_list(&app, 1, json!({"name": "Pharmacy"})).await;

    let (status, body) = get_json(app, "/shopping-lists?userId=1").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Pharmacy", "Weekly"]);
}

#[tokio::test]
async fn test_user_without_lists_gets_empty_index() {
    let (status, body) = get_json(test_app(grocery()), "/shopping-lists?userId=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_user_id_is_required() {
    for uri in [
        "/shopping-lists",
        "/shopping-lists?userId=abc",
        "/shopping-lists/1?userId=1.5",
        "/shopping-lists/1/products",
    ] {
        let (status, body) = get_json(test_app(grocery()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], r#"A valid "userId" is required."#);
    }
}

#[tokio::test]
async fn test_list_id_must_be_numeric() {
    let (status, body) = get_json(test_app(grocery()), "/shopping-lists/weekly?userId=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid list ID.");
}

#[tokio::test]
async fn test_another_users_list_is_not_found() {
    let app = test_app(grocery());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;
    let uri = format!("/shopping-lists/{}?userId=2", list["id"]);
    let expected = format!(
        "List with ID {} not found or does not belong to user.",
        list["id"]
    );

    let (status, body) = get_json(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], expected);

    let (status, _) = send_json(app.clone(), Method::PUT, &uri, Some(json!({"name": "Mine"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(app.clone(), Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(
        app,
        &format!("/shopping-lists/{}?userId=1", list["id"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_validation() {
    let app = test_app(grocery());
    let long_name = "x".repeat(256);
    let long_description = "x".repeat(1001);

    for (body, message) in [
        (json!({"name": "  "}), "List name is required."),
        (
            json!({"name": long_name}),
            "List name must be at most 255 characters.",
        ),
        (
            json!({"name": "Weekly", "description": long_description}),
            "Description must be at most 1000 characters.",
        ),
    ] {
        let (status, response) = send_json(
            app.clone(),
            Method::POST,
            "/shopping-lists?userId=1",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], message);
    }

    let (status, response) = send_json(
        app,
        Method::POST,
        "/shopping-lists?userId=1",
        Some(json!({"description": "no name"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_create_for_unknown_user_is_not_found() {
    let (status, body) = send_json(
        test_app(grocery()),
        Method::POST,
        "/shopping-lists?userId=999",
        Some(json!({"name": "Weekly"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User with ID 999 not found");
}

#[tokio::test]
async fn test_partial_update() {
    let app = test_app(grocery());
    let list = create_list(
        &app,
        1,
        json!({"name": "Weekly", "description": "Saturday shop"}),
    )
    .await;
    let uri = format!("/shopping-lists/{}?userId=1", list["id"]);

    let (status, body) =
        send_json(app.clone(), Method::PUT, &uri, Some(json!({"name": "Sunday"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "List updated successfully");
    assert_eq!(body["data"]["name"], "Sunday");
    assert_eq!(body["data"]["description"], "Saturday shop");

    let (_, body) = send_json(
        app.clone(),
        Method::PUT,
        &uri,
        Some(json!({"description": "", "is_template": true})),
    )
    .await;
    assert_eq!(body["data"]["description"], Value::Null);
    assert_eq!(body["data"]["is_template"], true);

    let (status, body) = send_json(app, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Sunday");
}

#[tokio::test]
async fn test_update_rejects_blank_name() {
    let app = test_app(grocery());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;

    let (status, body) = send_json(
        app,
        Method::PUT,
        &format!("/shopping-lists/{}?userId=1", list["id"]),
        Some(json!({"name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "List name is required.");
}

#[tokio::test]
async fn test_delete() {
    let app = test_app(grocery());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;
    let uri = format!("/shopping-lists/{}?userId=1", list["id"]);

    let (status, body) = send_json(app.clone(), Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("List with ID {} deleted successfully.", list["id"])
    );

    let (status, _) = get_json(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Items and the product view
// =============================================================================

#[tokio::test]
async fn test_add_item() {
    let app = test_app(grocery());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;

    let (status, body) = add_product(&app, &list["id"], json!({"productId": 10})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Item added successfully");
    assert_eq!(body["data"]["product_id"], 10);
    assert_eq!(body["data"]["shopping_list_id"], list["id"]);
    assert_eq!(body["data"]["quantity"], json!(1.0));
    assert_eq!(body["data"]["is_checked"], false);
}

#[tokio::test]
async fn test_add_item_errors() {
    let app = test_app(grocery());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;

    let (status, body) = add_product(&app, &list["id"], json!({"productId": 404})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product with ID 404 not found");

    let (status, body) = add_product(&app, &json!(77), json!({"productId": 10})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "List with ID 77 not found or does not belong to user."
    );

    let (status, _) = add_product(&app, &list["id"], json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = add_product(&app, &list["id"], json!({"productId": "milk"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        add_product(&app, &list["id"], json!({"productId": 10, "quantity": 0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Quantity"));
}

#[tokio::test]
async fn test_list_products_resolve_department_and_units() {
    let app = test_app(pantry());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;
    add_product(&app, &list["id"], json!({"productId": 22})).await;
    add_product(&app, &list["id"], json!({"productId": 21, "quantity": 3})).await;
    add_product(
        &app,
        &list["id"],
        json!({
            "productId": 20,
            "quantity": "1.5",
            "units": "slices",
            "departmentGrouping": "Deli",
            "notes": "sharp"
        }),
    )
    .await;

    let (status, body) = get_json(
        app,
        &format!("/shopping-lists/{}/products?userId=1", list["id"]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("Products for list {} fetched successfully.", list["id"])
    );
    assert_eq!(body["listId"], list["id"]);
    assert_eq!(body["listName"], "Weekly");
    assert_eq!(body["count"], 3);

    let items = body["data"].as_array().unwrap();
    let names: Vec<&str> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Cheddar", "Apples", "Batteries"]);

    assert_eq!(items[0]["department_display"], "Deli");
    assert_eq!(items[0]["units_display"], "slices");
    assert_eq!(items[0]["quantity"], json!(1.5));
    assert_eq!(items[0]["notes"], "sharp");
    assert_eq!(items[0]["list_id"], list["id"]);

    assert_eq!(items[1]["department_display"], "Produce");
    assert_eq!(items[1]["units_display"], "lb");
    assert_eq!(items[1]["quantity"], json!(3.0));

    assert_eq!(items[2]["department_display"], "Other");
    assert_eq!(items[2]["units_display"], "Unit");
    assert_eq!(items[2]["description"], "Batteries description");
}

#[tokio::test]
async fn test_empty_list_products() {
    let app = test_app(grocery());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;

    let (status, body) = get_json(
        app,
        &format!("/shopping-lists/{}/products?userId=1", list["id"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_post_products_adds_and_returns_view() {
    let app = test_app(pantry());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;
    let uri = format!("/shopping-lists/{}/products?userId=1", list["id"]);

    let (status, body) =
        send_json(app.clone(), Method::POST, &uri, Some(json!({"productId": 20}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["department_display"], "Dairy");

    let (_, body) = send_json(app, Method::POST, &uri, Some(json!({"productId": 10}))).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_other_users_cannot_read_list_products() {
    let app = test_app(pantry());
    let list = create_list(&app, 1, json!({"name": "Weekly"})).await;
    add_product(&app, &list["id"], json!({"productId": 20})).await;

    let (status, _) = get_json(
        app,
        &format!("/shopping-lists/{}/products?userId=2", list["id"]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_list_removes_items() {
    let app = test_app(pantry());
    let first = create_list(&app, 1, json!({"name": "Weekly"})).await;
    add_product(&app, &first["id"], json!({"productId": 20})).await;
    send_json(
        app.clone(),
        Method::DELETE,
        &format!("/shopping-lists/{}?userId=1", first["id"]),
        None,
    )
    .await;

    let second = create_list(&app, 1, json!({"name": "Next week"})).await;
    let (_, body) = get_json(
        app,
        &format!("/shopping-lists/{}/products?userId=1", second["id"]),
    )
    .await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_list_failure_is_hidden() {
    let (status, body) =
        get_json(test_app(grocery().unavailable()), "/shopping-lists?userId=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}
