use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{members, photos};

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = photos)]
pub struct Photo {
    pub id: Uuid,
    pub member_id: Uuid,
    pub url: String,
    pub public_id: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = members)]
pub struct Member {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub description: String,
    pub city: String,
    pub country: String,
    pub image: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}
