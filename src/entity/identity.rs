//! Identity entity model.
//!
//! Identities are owned by the auth side of the backend. The panel never
//! reads this table directly; it goes through the identity listing and
//! confirmation procedures instead.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing a registered identity.
///
/// # Database Schema
///
/// | Column             | Type                    | Description                          |
/// |--------------------|-------------------------|--------------------------------------|
/// | id                 | TEXT (Primary Key)      | Identity ID (UUID)                   |
/// | email              | TEXT (Unique)           | Sign-in email address                |
/// | password_hash      | TEXT                    | Argon2 PHC string                    |
/// | email_confirmed_at | TIMESTAMPTZ (nullable)  | When the address was confirmed       |
/// | created_at         | TIMESTAMPTZ             | Registration time                    |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "identities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    #[sea_orm(unique, column_type = "Text")]
    pub email: String,

    #[sea_orm(column_type = "Text")]
    pub password_hash: String,

    /// `None` until the identity is confirmed.
    pub email_confirmed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
