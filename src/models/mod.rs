//! Shared data models for the marketplace backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod auth;
pub use auth::*;

/// User model
///
/// `rating` is derived: the mean of all reviews naming this user as reviewee,
/// rounded to one decimal. NULL until the first review lands.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub hostel: Option<String>,
    pub room_number: Option<String>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            hostel: user.hostel,
            room_number: user.room_number,
            rating: user.rating,
            created_at: user.created_at,
        }
    }
}

/// Public profile projection: what other users may see about a user
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub hostel: Option<String>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// API response envelope: `{success, data?, message?, pagination?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    /// Successful response carrying data plus pagination metadata
    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }
}

/// Pagination metadata included alongside list responses
#[derive(Debug, Serialize, Clone, Copy)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            total,
            page,
            total_pages,
            limit,
        }
    }
}

/// Page/limit query parameters shared by list endpoints
#[derive(Debug, Deserialize, Default)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Clamp to sane bounds and compute the row offset
    pub fn resolve(&self, default_limit: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, 100);
        let offset = (page - 1) * limit;
        (page, limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(45, 2, 20);
        assert_eq!(p.total_pages, 3);

        let p = Pagination::new(40, 1, 20);
        assert_eq!(p.total_pages, 2);

        let p = Pagination::new(0, 1, 20);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn test_pagination_params_resolve() {
        let params = PaginationParams {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(params.resolve(20), (3, 10, 20));

        // Defaults and clamping
        let params = PaginationParams::default();
        assert_eq!(params.resolve(20), (1, 20, 0));

        let params = PaginationParams {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(params.resolve(20), (1, 100, 0));
    }
}
