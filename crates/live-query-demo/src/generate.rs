//! Random demo data.

use rand::Rng;
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Donald", "Edsger", "Grace", "John", "Leslie", "Margaret", "Tony",
];

const LAST_NAMES: &[&str] = &[
    "Backus", "Dijkstra", "Hamilton", "Hoare", "Hopper", "Knuth", "Lamport", "Liskov", "Lovelace",
    "Turing",
];

const CLUB_NAMES: &[&str] = &[
    "Astronomy", "Chess", "Climbing", "Cycling", "Debate", "Gardening", "Photography", "Sailing",
];

pub fn gen_uuid() -> String {
    Uuid::new_v4().to_string()
}

pub fn generate_random_name() -> String {
    let mut rng = rand::rng();
    let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
    format!("{first} {last}")
}

pub fn generate_random_club() -> String {
    let mut rng = rand::rng();
    let name = CLUB_NAMES[rng.random_range(0..CLUB_NAMES.len())];
    format!("{name} Club")
}

/// Random value in `0..100`.
pub fn generate_random_value() -> i64 {
    rand::rng().random_range(0..100)
}
