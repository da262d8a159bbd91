//! Shopping list route handlers.
//!
//! Every route acts for the user named by `?userId=`. A list that belongs to
//! someone else is reported exactly like a list that does not exist.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::instrument;

use bestcart_core::{ShoppingListId, UserId};

use super::params::{UserParams, json_body};
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{
    ListItem, ListProductView, NewListItem, NewShoppingList, ShoppingList, ShoppingListUpdate,
};
use crate::state::AppState;

const MAX_NAME_CHARS: usize = 255;
const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Largest quantity a `NUMERIC(10, 2)` column holds.
// 9_999_999_999 at scale 2, split into the low and middle 32-bit words.
const MAX_QUANTITY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

type Params = std::result::Result<Query<UserParams>, QueryRejection>;

/// `{message, data}` envelope for list writes.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

/// Body of a delete confirmation.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: String,
}

/// Items on a list, grouped for display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProducts {
    pub message: String,
    pub list_id: ShoppingListId,
    pub list_name: String,
    pub count: usize,
    pub data: Vec<ListProductView>,
}

fn parse_list_id(raw: &str) -> Result<ShoppingListId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid list ID.".to_string()))
}

fn list_not_found(list_id: ShoppingListId) -> AppError {
    AppError::NotFound(format!(
        "List with ID {list_id} not found or does not belong to user."
    ))
}

fn validate_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("List name is required.".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::BadRequest(format!(
            "List name must be at most {MAX_NAME_CHARS} characters."
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    if description.is_some_and(|d| d.trim().chars().count() > MAX_DESCRIPTION_CHARS) {
        return Err(AppError::BadRequest(format!(
            "Description must be at most {MAX_DESCRIPTION_CHARS} characters."
        )));
    }
    Ok(())
}

/// Round the requested quantity to cents and check it fits the column.
fn normalize_quantity(item: &mut NewListItem) -> Result<()> {
    if let Some(quantity) = item.quantity {
        let quantity = quantity.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if quantity <= Decimal::ZERO || quantity > MAX_QUANTITY {
            return Err(AppError::BadRequest(format!(
                "Quantity must be greater than 0 and at most {MAX_QUANTITY}."
            )));
        }
        item.quantity = Some(quantity);
    }
    Ok(())
}

/// Load a list the user owns, or `404`.
async fn owned_list<R: Repository>(
    repo: &R,
    user_id: UserId,
    list_id: ShoppingListId,
) -> Result<ShoppingList> {
    repo.get_shopping_list(user_id, list_id)
        .await?
        .ok_or_else(|| list_not_found(list_id))
}

/// Check the list and product exist, then put the product on the list.
async fn add_item<R: Repository>(
    repo: &R,
    user_id: UserId,
    list_id: ShoppingListId,
    mut item: NewListItem,
) -> Result<(ShoppingList, ListItem)> {
    normalize_quantity(&mut item)?;

    let list = owned_list(repo, user_id, list_id).await?;
    if repo.get_product(item.product_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Product with ID {} not found",
            item.product_id
        )));
    }

    let added = repo.add_list_item(list_id, &item).await?;
    tracing::info!(%list_id, product_id = %item.product_id, item_id = %added.id, "Added list item");
    Ok((list, added))
}

async fn products_view<R: Repository>(repo: &R, list: ShoppingList) -> Result<ListProducts> {
    let data: Vec<ListProductView> = repo
        .list_products_for_list(list.id)
        .await?
        .into_iter()
        .map(ListProductView::from)
        .collect();

    Ok(ListProducts {
        message: format!("Products for list {} fetched successfully.", list.id),
        list_id: list.id,
        list_name: list.name,
        count: data.len(),
        data,
    })
}

/// The user's lists (templates excluded), most recently updated first.
#[instrument(skip(state))]
pub async fn index<R: Repository>(
    State(state): State<AppState<R>>,
    params: Params,
) -> Result<Json<Vec<ShoppingList>>> {
    let user_id = UserParams::user_id(params)?;
    Ok(Json(state.repo().list_shopping_lists(user_id).await?))
}

/// One of the user's lists.
#[instrument(skip(state))]
pub async fn show<R: Repository>(
    State(state): State<AppState<R>>,
    Path(list_id): Path<String>,
    params: Params,
) -> Result<Json<ShoppingList>> {
    let user_id = UserParams::user_id(params)?;
    let list_id = parse_list_id(&list_id)?;
    Ok(Json(owned_list(state.repo(), user_id, list_id).await?))
}

/// Create a list for the user.
#[instrument(skip(state, body))]
pub async fn create<R: Repository>(
    State(state): State<AppState<R>>,
    params: Params,
    body: std::result::Result<Json<NewShoppingList>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<ShoppingList>>)> {
    let user_id = UserParams::user_id(params)?;
    let list = json_body(body)?;
    validate_name(&list.name)?;
    validate_description(list.description.as_deref())?;

    if state.repo().get_user(user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User with ID {user_id} not found")));
    }

    let created = state.repo().create_shopping_list(user_id, &list).await?;
    tracing::info!(%user_id, list_id = %created.id, "Created shopping list");

    Ok((
        StatusCode::CREATED,
        Json(Envelope {
            message: "List created successfully".to_string(),
            data: created,
        }),
    ))
}

/// Partially update one of the user's lists.
#[instrument(skip(state, body))]
pub async fn update<R: Repository>(
    State(state): State<AppState<R>>,
    Path(list_id): Path<String>,
    params: Params,
    body: std::result::Result<Json<ShoppingListUpdate>, JsonRejection>,
) -> Result<Json<Envelope<ShoppingList>>> {
    let user_id = UserParams::user_id(params)?;
    let list_id = parse_list_id(&list_id)?;
    let update = json_body(body)?;
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    validate_description(update.description.as_deref())?;

    let updated = if update.is_empty() {
        owned_list(state.repo(), user_id, list_id).await?
    } else {
        state
            .repo()
            .update_shopping_list(user_id, list_id, &update)
            .await?
            .ok_or_else(|| list_not_found(list_id))?
    };

    Ok(Json(Envelope {
        message: "List updated successfully".to_string(),
        data: updated,
    }))
}

/// Delete one of the user's lists along with its items.
#[instrument(skip(state))]
pub async fn destroy<R: Repository>(
    State(state): State<AppState<R>>,
    Path(list_id): Path<String>,
    params: Params,
) -> Result<Json<Deleted>> {
    let user_id = UserParams::user_id(params)?;
    let list_id = parse_list_id(&list_id)?;

    if !state.repo().delete_shopping_list(user_id, list_id).await? {
        return Err(list_not_found(list_id));
    }
    tracing::info!(%user_id, %list_id, "Deleted shopping list");

    Ok(Json(Deleted {
        message: format!("List with ID {list_id} deleted successfully."),
    }))
}

/// Put a product on one of the user's lists. Responds with the new item.
#[instrument(skip(state, body))]
pub async fn add_list_item<R: Repository>(
    State(state): State<AppState<R>>,
    Path(list_id): Path<String>,
    params: Params,
    body: std::result::Result<Json<NewListItem>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<ListItem>>)> {
    let user_id = UserParams::user_id(params)?;
    let list_id = parse_list_id(&list_id)?;
    let item = json_body(body)?;

    let (_, added) = add_item(state.repo(), user_id, list_id, item).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope {
            message: "Item added successfully".to_string(),
            data: added,
        }),
    ))
}

/// The products on one of the user's lists, with display department and units.
#[instrument(skip(state))]
pub async fn list_products<R: Repository>(
    State(state): State<AppState<R>>,
    Path(list_id): Path<String>,
    params: Params,
) -> Result<Json<ListProducts>> {
    let user_id = UserParams::user_id(params)?;
    let list_id = parse_list_id(&list_id)?;

    let list = owned_list(state.repo(), user_id, list_id).await?;
    Ok(Json(products_view(state.repo(), list).await?))
}

/// Put a product on the list and respond with the refreshed product view.
#[instrument(skip(state, body))]
pub async fn add_product<R: Repository>(
    State(state): State<AppState<R>>,
    Path(list_id): Path<String>,
    params: Params,
    body: std::result::Result<Json<NewListItem>, JsonRejection>,
) -> Result<(StatusCode, Json<ListProducts>)> {
    let user_id = UserParams::user_id(params)?;
    let list_id = parse_list_id(&list_id)?;
    let item = json_body(body)?;

    let (list, _) = add_item(state.repo(), user_id, list_id, item).await?;
    Ok((StatusCode::CREATED, Json(products_view(state.repo(), list).await?)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bestcart_core::ProductId;

    use super::*;

    #[test]
    fn test_list_id_must_be_numeric() {
        assert_eq!(parse_list_id(" 4 ").unwrap(), ShoppingListId::new(4));
        let err = parse_list_id("four").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid list ID."));
    }

    #[test]
    fn test_name_bounds() {
        assert!(validate_name("Weekly").is_ok());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_CHARS)).is_ok());
        assert!(validate_name(&"a".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_description_bounds() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some(&"é".repeat(MAX_DESCRIPTION_CHARS))).is_ok());
        assert!(validate_description(Some(&"é".repeat(MAX_DESCRIPTION_CHARS + 1))).is_err());
    }

    #[test]
    fn test_max_quantity_fits_numeric_10_2() {
        assert_eq!(MAX_QUANTITY.to_string(), "99999999.99");
    }

    #[test]
    fn test_quantity_is_rounded_and_bounded() {
        let mut item = NewListItem::product(ProductId::new(1));
        item.quantity = Some(Decimal::new(1_005, 3));
        normalize_quantity(&mut item).unwrap();
        assert_eq!(item.quantity, Some(Decimal::new(101, 2)));

        for bad in [Decimal::ZERO, Decimal::new(-1, 0), Decimal::new(1, 3)] {
            item.quantity = Some(bad);
            assert!(normalize_quantity(&mut item).is_err(), "{bad}");
        }

        item.quantity = Some(MAX_QUANTITY + Decimal::ONE);
        assert!(normalize_quantity(&mut item).is_err());
    }

    #[test]
    fn test_missing_quantity_is_left_for_the_default() {
        let mut item = NewListItem::product(ProductId::new(1));
        normalize_quantity(&mut item).unwrap();
        assert_eq!(item.quantity, None);
    }
}
