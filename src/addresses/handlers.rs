// HTTP handlers for the address book

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::addresses::models::{Address, CreateAddress, UpdateAddress};
use crate::error::ApiError;

const ADDRESS_COLUMNS: &str = "id, user_id, first_name, last_name, address1, address2, city, \
     country, zip, phone, is_default, created_at, updated_at";

/// Handler for POST /api/addresses
/// Marking an address default demotes the user's previous default in the
/// same transaction.
pub async fn create_address_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateAddress>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    request.validate()?;

    let mut tx = state.db.begin().await?;

    if request.is_default {
        sqlx::query("UPDATE addresses SET is_default = FALSE, updated_at = NOW() WHERE user_id = $1")
            .bind(request.user_id)
            .execute(&mut *tx)
            .await?;
    }

    let address = sqlx::query_as::<_, Address>(&format!(
        r#"
        INSERT INTO addresses
            (user_id, first_name, last_name, address1, address2, city, country, zip, phone, is_default)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {ADDRESS_COLUMNS}
        "#
    ))
    .bind(request.user_id)
    .bind(&request.first_name)
    .bind(&request.last_name)
    .bind(&request.address1)
    .bind(&request.address2)
    .bind(&request.city)
    .bind(&request.country)
    .bind(&request.zip)
    .bind(&request.phone)
    .bind(request.is_default)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// Handler for GET /api/addresses/user/:user_id
pub async fn list_addresses_handler(
    State(state): State<crate::AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let addresses = sqlx::query_as::<_, Address>(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(addresses))
}

/// Handler for PUT /api/addresses/:id
pub async fn update_address_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAddress>,
) -> Result<Json<Address>, ApiError> {
    request.validate()?;

    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Address>(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Address".to_string(),
        id: id.to_string(),
    })?;

    let becoming_default = request.is_default.unwrap_or(existing.is_default);
    if becoming_default && !existing.is_default {
        sqlx::query("UPDATE addresses SET is_default = FALSE, updated_at = NOW() WHERE user_id = $1")
            .bind(existing.user_id)
            .execute(&mut *tx)
            .await?;
    }

    let address = sqlx::query_as::<_, Address>(&format!(
        r#"
        UPDATE addresses
        SET first_name = $1,
            last_name = $2,
            address1 = $3,
            address2 = $4,
            city = $5,
            country = $6,
            zip = $7,
            phone = $8,
            is_default = $9,
            updated_at = NOW()
        WHERE id = $10
        RETURNING {ADDRESS_COLUMNS}
        "#
    ))
    .bind(request.first_name.unwrap_or(existing.first_name))
    .bind(request.last_name.or(existing.last_name))
    .bind(request.address1.unwrap_or(existing.address1))
    .bind(request.address2.or(existing.address2))
    .bind(request.city.unwrap_or(existing.city))
    .bind(request.country.unwrap_or(existing.country))
    .bind(request.zip.unwrap_or(existing.zip))
    .bind(request.phone.unwrap_or(existing.phone))
    .bind(becoming_default)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(address))
}

/// Handler for DELETE /api/addresses/:id
pub async fn delete_address_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Address".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
