mod addresses;
mod auth;
mod cart;
mod coupons;
mod db;
mod error;
mod models;
mod orders;
mod payments;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;
use validator::Validate;

use auth::{AuthService, InMemoryOtpStore, OtpStore, RedisOtpStore};
use cart::{CartRepository, CartService};
use coupons::CouponRepository;
use error::ApiError;
use models::{
    derive_discount_percent, Category, CreateCategory, CreateProduct, CreateSection, Product,
    Section, UpdateProduct,
};
use orders::{OrderService, OrdersRepository};
use payments::RazorpayClient;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        get_products,
        get_product_by_id,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, Category, CreateCategory, Section, CreateSection)
    ),
    tags(
        (name = "catalog", description = "Product catalog management endpoints")
    ),
    info(
        title = "Bazaar API",
        version = "1.0.0",
        description = "E-commerce backend: catalog, carts, coupons, orders and payments"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cart_service: CartService,
    pub order_service: OrderService,
    pub coupon_repo: CouponRepository,
    pub auth_service: AuthService,
    pub razorpay: RazorpayClient,
}

const PRODUCT_COLUMNS: &str = "id, title, brand, sku, price, discount_price, discount_percent, \
     stock, status, description, category_id, section_id, colors, sizes, images, created_at, \
     updated_at";

/// Handler for POST /api/products
/// Creates a new catalog product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Duplicate SKU"),
        (status = 500, description = "Internal server error")
    ),
    tag = "catalog"
)]
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    tracing::debug!("Creating new product: {}", payload.sku);

    payload.validate()?;
    for (field, amount) in [("price", payload.price), ("discount_price", payload.discount_price)] {
        if validation::validate_positive_amount(amount).is_err() {
            return Err(validation::field_error(field, "amount_must_be_positive").into());
        }
    }

    if db::check_duplicate_sku(&state.db, &payload.sku).await? {
        tracing::warn!("Attempt to create duplicate SKU: {}", payload.sku);
        return Err(ApiError::Conflict {
            message: format!("Product with SKU '{}' already exists", payload.sku),
        });
    }

    let discount_percent = derive_discount_percent(payload.price, payload.discount_price);

    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products
            (title, brand, sku, price, discount_price, discount_percent, stock, description,
             category_id, section_id, colors, sizes, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(&payload.title)
    .bind(&payload.brand)
    .bind(&payload.sku)
    .bind(payload.price)
    .bind(payload.discount_price)
    .bind(discount_percent)
    .bind(payload.stock)
    .bind(&payload.description)
    .bind(payload.category_id)
    .bind(payload.section_id)
    .bind(&payload.colors)
    .bind(&payload.sizes)
    .bind(&payload.images)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created product {}", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Query parameters for product listing
#[derive(Debug, Deserialize)]
struct ProductListQuery {
    category_id: Option<Uuid>,
    section_id: Option<Uuid>,
    status: Option<String>,
}

/// Handler for GET /api/products
/// Lists products with optional category/section/status filters
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, description = "Internal server error")
    ),
    tag = "catalog"
)]
async fn get_products(
    Query(query): Query<ProductListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = sqlx::query_as::<_, Product>(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products
        WHERE ($1::uuid IS NULL OR category_id = $1)
          AND ($2::uuid IS NULL OR section_id = $2)
          AND ($3::text IS NULL OR status = $3)
        ORDER BY created_at DESC
        "#
    ))
    .bind(query.category_id)
    .bind(query.section_id)
    .bind(query.status)
    .fetch_all(&state.db)
    .await?;

    tracing::debug!("Retrieved {} products", products.len());
    Ok(Json(products))
}

/// Handler for GET /api/products/:id
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "catalog"
)]
async fn get_product_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Product".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(product))
}

/// Handler for PUT /api/products/:id
/// Partial update; omitted fields keep their current values
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, description = "Invalid input data"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Duplicate SKU"),
        (status = 500, description = "Internal server error")
    ),
    tag = "catalog"
)]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    for (field, amount) in [("price", payload.price), ("discount_price", payload.discount_price)] {
        if matches!(amount, Some(value) if validation::validate_positive_amount(value).is_err()) {
            return Err(validation::field_error(field, "amount_must_be_positive").into());
        }
    }

    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Product".to_string(),
        id: id.to_string(),
    })?;

    if let Some(ref new_sku) = payload.sku {
        if new_sku != &existing.sku
            && db::check_duplicate_sku_excluding_id(&state.db, new_sku, id).await?
        {
            return Err(ApiError::Conflict {
                message: format!("Product with SKU '{}' already exists", new_sku),
            });
        }
    }

    let price = payload.price.unwrap_or(existing.price);
    let discount_price = payload.discount_price.unwrap_or(existing.discount_price);

    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET title = $1,
            brand = $2,
            sku = $3,
            price = $4,
            discount_price = $5,
            discount_percent = $6,
            stock = $7,
            status = $8,
            description = $9,
            category_id = $10,
            section_id = $11,
            colors = $12,
            sizes = $13,
            images = $14,
            updated_at = NOW()
        WHERE id = $15
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(payload.title.unwrap_or(existing.title))
    .bind(payload.brand.unwrap_or(existing.brand))
    .bind(payload.sku.unwrap_or(existing.sku))
    .bind(price)
    .bind(discount_price)
    .bind(derive_discount_percent(price, discount_price))
    .bind(payload.stock.unwrap_or(existing.stock))
    .bind(payload.status.unwrap_or(existing.status))
    .bind(payload.description.unwrap_or(existing.description))
    .bind(payload.category_id.or(existing.category_id))
    .bind(payload.section_id.or(existing.section_id))
    .bind(payload.colors.unwrap_or(existing.colors))
    .bind(payload.sizes.unwrap_or(existing.sizes))
    .bind(payload.images.unwrap_or(existing.images))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated product {}", id);
    Ok(Json(product))
}

/// Handler for DELETE /api/products/:id
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "catalog"
)]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Product".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Successfully deleted product {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    payload.validate()?;

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, image) VALUES ($1, $2) RETURNING id, name, image, created_at",
    )
    .bind(&payload.name)
    .bind(&payload.image)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return ApiError::Conflict {
                    message: format!("Category '{}' already exists", payload.name),
                };
            }
        }
        ApiError::DatabaseError(e)
    })?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for GET /api/categories
async fn get_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT id, name, image, created_at FROM categories ORDER BY name")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(categories))
}

/// Handler for DELETE /api/categories/:id
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Category".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/sections
async fn create_section(
    State(state): State<AppState>,
    Json(payload): Json<CreateSection>,
) -> Result<(StatusCode, Json<Section>), ApiError> {
    payload.validate()?;

    let section = sqlx::query_as::<_, Section>(
        "INSERT INTO sections (name) VALUES ($1) RETURNING id, name, created_at",
    )
    .bind(&payload.name)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return ApiError::Conflict {
                    message: format!("Section '{}' already exists", payload.name),
                };
            }
        }
        ApiError::DatabaseError(e)
    })?;

    Ok((StatusCode::CREATED, Json(section)))
}

/// Handler for GET /api/sections
async fn get_sections(State(state): State<AppState>) -> Result<Json<Vec<Section>>, ApiError> {
    let sections =
        sqlx::query_as::<_, Section>("SELECT id, name, created_at FROM sections ORDER BY name")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(sections))
}

/// Handler for DELETE /api/sections/:id
async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM sections WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            resource: "Section".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates and configures the application router.
/// The OTP send route sits behind a per-IP rate limit.
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let governor_conf = Box::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
            .expect("valid rate limit configuration"),
    );

    let otp_routes = Router::new()
        .route("/api/auth/send-otp", post(auth::handlers::send_otp_handler))
        .layer(GovernorLayer {
            config: Box::leak(governor_conf),
        });

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Catalog
        .route("/api/products", post(create_product))
        .route("/api/products", get(get_products))
        .route("/api/products/:id", get(get_product_by_id))
        .route("/api/products/:id", put(update_product))
        .route("/api/products/:id", delete(delete_product))
        .route("/api/categories", post(create_category))
        .route("/api/categories", get(get_categories))
        .route("/api/categories/:id", delete(delete_category))
        .route("/api/sections", post(create_section))
        .route("/api/sections", get(get_sections))
        .route("/api/sections/:id", delete(delete_section))
        // Coupons
        .route("/api/coupons", post(coupons::handlers::create_coupon_handler))
        .route("/api/coupons", get(coupons::handlers::list_coupons_handler))
        .route("/api/coupons/:id", patch(coupons::handlers::update_coupon_handler))
        .route("/api/coupons/:id", delete(coupons::handlers::delete_coupon_handler))
        // Cart
        .route("/api/cart/add", post(cart::handlers::add_item_handler))
        .route("/api/cart/remove", delete(cart::handlers::remove_item_handler))
        .route("/api/cart/update-qty", post(cart::handlers::update_quantity_handler))
        .route("/api/cart/apply-coupon", post(cart::handlers::apply_coupon_handler))
        .route("/api/cart/remove-coupon", post(cart::handlers::remove_coupon_handler))
        .route("/api/cart/clear", post(cart::handlers::clear_cart_handler))
        .route("/api/cart/:user_id", get(cart::handlers::get_cart_handler))
        // Orders
        .route("/api/orders/create", post(orders::handlers::create_order_handler))
        .route("/api/orders", get(orders::handlers::list_orders_handler))
        .route("/api/orders/user/:user_id", get(orders::handlers::list_user_orders_handler))
        .route("/api/orders/cancel/:order_id", put(orders::handlers::cancel_order_handler))
        .route(
            "/api/orders/update-status/:order_id",
            put(orders::handlers::update_order_status_handler),
        )
        .route("/api/orders/:order_id", get(orders::handlers::get_order_handler))
        // Payments
        .route(
            "/api/payment/razorpay/create-order",
            post(payments::handlers::create_payment_order_handler),
        )
        .route(
            "/api/payment/razorpay/verify",
            post(payments::handlers::verify_payment_handler),
        )
        // Auth
        .route("/api/auth/admin/login", post(auth::handlers::admin_login_handler))
        .route("/api/auth/verify-otp", post(auth::handlers::verify_otp_handler))
        .route("/api/auth/users/:id/block", patch(auth::handlers::block_user_handler))
        .route("/api/auth/users/:id/unblock", patch(auth::handlers::unblock_user_handler))
        .merge(otp_routes)
        .layer(cors)
        .with_state(state)
}

/// Build the shared application state from a database pool and the
/// process environment.
async fn build_state(db_pool: PgPool) -> AppState {
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");

    let otp_store: Arc<dyn OtpStore> = match std::env::var("REDIS_URL") {
        Ok(redis_url) => {
            let store = RedisOtpStore::connect(&redis_url)
                .await
                .expect("Failed to connect to redis");
            tracing::info!("OTP store: redis");
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("REDIS_URL not set; OTP codes are stored in process memory");
            Arc::new(InMemoryOtpStore::new())
        }
    };

    let razorpay_key_id = std::env::var("RAZORPAY_KEY_ID").unwrap_or_else(|_| {
        tracing::warn!("RAZORPAY_KEY_ID not set; payment order creation will fail");
        String::new()
    });
    let razorpay_key_secret = std::env::var("RAZORPAY_KEY_SECRET").unwrap_or_default();

    let cart_repo = CartRepository::new(db_pool.clone());
    let coupon_repo = CouponRepository::new(db_pool.clone());
    let orders_repo = OrdersRepository::new(db_pool.clone());
    let user_repo = auth::repository::UserRepository::new(db_pool.clone());
    let token_service = auth::token::TokenService::new(jwt_secret);

    AppState {
        db: db_pool,
        cart_service: CartService::new(cart_repo, coupon_repo.clone()),
        order_service: OrderService::new(orders_repo),
        coupon_repo,
        auth_service: AuthService::new(user_repo, otp_store, token_service),
        razorpay: RazorpayClient::new(razorpay_key_id, razorpay_key_secret),
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Bazaar API - Starting...");

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = build_state(db_pool).await;
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Bazaar API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    // Peer addresses are needed by the OTP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
