use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::utils::non_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i32,
    pub first_line: String,
    pub city: String,
    pub postcode: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub first_line: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct NewLocation {
    pub first_line: String,
    pub city: String,
    pub postcode: String,
}

impl CreateLocationRequest {
    /// 所有缺失字段一次性报出
    pub fn validate(self) -> Result<NewLocation, Vec<&'static str>> {
        let first_line = non_blank(self.first_line);
        let city = non_blank(self.city);
        let postcode = non_blank(self.postcode);

        match (first_line, city, postcode) {
            (Some(first_line), Some(city), Some(postcode)) => Ok(NewLocation {
                first_line,
                city,
                postcode,
            }),
            (first_line, city, postcode) => {
                let mut errors = Vec::new();
                if first_line.is_none() {
                    errors.push("First line is required");
                }
                if city.is_none() {
                    errors.push("City is required");
                }
                if postcode.is_none() {
                    errors.push("Postcode is required");
                }
                Err(errors)
            }
        }
    }
}

const LOCATION_COLUMNS: &str = "id, first_line, city, postcode";

impl Location {
    pub async fn create(pool: &PgPool, new: &NewLocation) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO addresses (first_line, city, postcode)
            VALUES ($1, $2, $3)
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(&new.first_line)
        .bind(&new.city)
        .bind(&new.postcode)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM addresses ORDER BY id"
        ))
        .fetch_all(pool)
        .await
    }
}
