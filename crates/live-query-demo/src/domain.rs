//! Demo domain rows: people, clubs, and the membership join table.

use serde::{Deserialize, Serialize};

pub const TABLE_PERSON: &str = "person";
pub const TABLE_CLUB: &str = "club";
pub const TABLE_CLUBMEMBER: &str = "clubmember";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: String,
    pub name: String,
    pub age: i64,
}

/// Membership of one person in one club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubMember {
    pub id: String,
    pub club_id: String,
    pub person_id: String,
}
