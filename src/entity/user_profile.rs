//! Profile entity model.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing an application profile.
///
/// The primary key is the identity ID, so an identity has at most one
/// profile. There is no foreign key: an identity may exist without a profile
/// when profile creation failed after registration.
///
/// # Database Schema
///
/// | Column | Type               | Description                              |
/// |--------|--------------------|------------------------------------------|
/// | id     | TEXT (Primary Key) | Identity ID                              |
/// | email  | TEXT               | Email at registration time               |
/// | role   | TEXT (nullable)    | `admin` or `user`; missing means `user`  |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub email: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub role: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
