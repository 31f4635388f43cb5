//! Listing service layer - ownership-gated CRUD and search

use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::listings::model::{
    validate_price_rule, Availability, CreateListingRequest, Listing, ListingQuery, ListingSort,
    UpdateListingRequest,
};

/// Listing service errors
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Item not found")]
    NotFound,

    #[error("You do not own this item")]
    NotOwner,

    #[error("{0}")]
    Validation(String),

    #[error("Item has an active transaction and cannot be deleted")]
    HasActiveTransaction,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ListingError {
    fn from(e: sqlx::Error) -> Self {
        ListingError::Database(e.to_string())
    }
}

impl From<ListingError> for ApiError {
    fn from(e: ListingError) -> Self {
        match e {
            ListingError::NotFound => ApiError::NotFound(e.to_string()),
            ListingError::NotOwner => ApiError::Forbidden(e.to_string()),
            ListingError::Validation(msg) => ApiError::ValidationError(msg),
            ListingError::HasActiveTransaction => ApiError::Conflict(e.to_string()),
            ListingError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// Listing service for managing the item catalog
#[derive(Clone)]
pub struct ListingService {
    db_pool: PgPool,
}

impl ListingService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a new listing owned by `owner_id`
    pub async fn create_listing(
        &self,
        owner_id: Uuid,
        request: CreateListingRequest,
    ) -> Result<Listing, ListingError> {
        request
            .validate()
            .map_err(|e| ListingError::Validation(e.to_string()))?;
        request.validate_price().map_err(ListingError::Validation)?;

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (
                id, title, description, category, condition, listing_type,
                availability, price, images, tags, owner_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.title.trim())
        .bind(&request.description)
        .bind(&request.category)
        .bind(request.condition)
        .bind(request.listing_type)
        .bind(Availability::Available)
        .bind(request.price)
        .bind(&request.images)
        .bind(&request.tags)
        .bind(owner_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(listing_id = %listing.id, owner_id = %owner_id, "Listing created");

        Ok(listing)
    }

    /// Get a single listing by ID
    pub async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>, ListingError> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(listing)
    }

    /// Search listings with filters, pagination, and sorting
    pub async fn find_listings(
        &self,
        query: &ListingQuery,
    ) -> Result<(Vec<Listing>, i64), ListingError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM listings WHERE 1=1");
        push_filters(&mut count_builder, query);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.db_pool)
            .await?;

        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM listings WHERE 1=1");
        push_filters(&mut query_builder, query);

        match query.sort.unwrap_or_default() {
            ListingSort::Newest => query_builder.push(" ORDER BY created_at DESC"),
            ListingSort::PriceAsc => query_builder.push(" ORDER BY price ASC NULLS LAST"),
            ListingSort::PriceDesc => query_builder.push(" ORDER BY price DESC NULLS LAST"),
        };

        query_builder.push(" LIMIT ");
        query_builder.push_bind(limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let listings = query_builder
            .build_query_as::<Listing>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok((listings, total))
    }

    /// List every listing owned by a user, newest first
    pub async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<Listing>, ListingError> {
        let listings = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(listings)
    }

    /// Update a listing's mutable fields; only the owner may update
    pub async fn update_listing(
        &self,
        owner_id: Uuid,
        id: Uuid,
        request: UpdateListingRequest,
    ) -> Result<Listing, ListingError> {
        request
            .validate()
            .map_err(|e| ListingError::Validation(e.to_string()))?;

        let existing = self
            .get_listing(id)
            .await?
            .ok_or(ListingError::NotFound)?;

        if existing.owner_id != owner_id {
            return Err(ListingError::NotOwner);
        }

        // Re-check the price rule against the merged result so an update
        // cannot break the price-iff-sell invariant.
        let merged_type = request.listing_type.unwrap_or(existing.listing_type);
        let merged_price = match request.price {
            Some(p) => p,
            None => existing.price,
        };
        validate_price_rule(merged_type, merged_price).map_err(ListingError::Validation)?;

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                category = COALESCE($3, category),
                condition = COALESCE($4, condition),
                listing_type = $5,
                price = $6,
                images = COALESCE($7, images),
                tags = COALESCE($8, tags),
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(request.title.as_deref().map(str::trim))
        .bind(&request.description)
        .bind(&request.category)
        .bind(request.condition)
        .bind(merged_type)
        .bind(merged_price)
        .bind(&request.images)
        .bind(&request.tags)
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(listing)
    }

    /// Delete a listing; only the owner may delete, and only while no
    /// non-terminal transaction references it
    pub async fn delete_listing(&self, owner_id: Uuid, id: Uuid) -> Result<(), ListingError> {
        let existing = self
            .get_listing(id)
            .await?
            .ok_or(ListingError::NotFound)?;

        if existing.owner_id != owner_id {
            return Err(ListingError::NotOwner);
        }

        let active: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE (listing_id = $1 OR traded_listing_id = $1)
              AND status IN ('pending', 'accepted')
            "#,
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        if active > 0 {
            return Err(ListingError::HasActiveTransaction);
        }

        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        tracing::info!(listing_id = %id, owner_id = %owner_id, "Listing deleted");

        Ok(())
    }
}

/// Append WHERE clauses for every filter present in the query
fn push_filters(builder: &mut QueryBuilder<Postgres>, query: &ListingQuery) {
    if let Some(category) = &query.category {
        builder.push(" AND ");
        builder.push_bind(category.clone());
        builder.push(" = ANY(category)");
    }
    if let Some(condition) = query.condition {
        builder.push(" AND condition = ");
        builder.push_bind(condition);
    }
    if let Some(listing_type) = query.listing_type {
        builder.push(" AND listing_type = ");
        builder.push_bind(listing_type);
    }
    if let Some(availability) = query.availability {
        builder.push(" AND availability = ");
        builder.push_bind(availability);
    }
    if let Some(min_price) = query.min_price {
        builder.push(" AND price >= ");
        builder.push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        builder.push(" AND price <= ");
        builder.push_bind(max_price);
    }
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search.trim());
        builder.push(" AND (title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR description ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS t WHERE t ILIKE ");
        builder.push_bind(pattern);
        builder.push("))");
    }
}
