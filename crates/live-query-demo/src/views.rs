//! Headless view models over the store.
//!
//! Each view holds the live queries the corresponding screen renders from
//! and exposes the commands its buttons issue. Dropping a view tears down
//! its subscriptions.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use live_query::live::{create_derived_query, create_live_query, LiveQuery};
use live_query::notifier::Notifier;

use crate::domain::{Club, ClubMember, Person};
use crate::generate::{gen_uuid, generate_random_club, generate_random_name, generate_random_value};
use crate::store::{
    ClubsQuery, Database, MembershipsQuery, PeopleQuery, PersonByIdQuery, SortOrder, StoreResult,
};

// ============================================================================
// PeopleView
// ============================================================================

/// The people list: all people ordered by name and filtered by a search
/// string. Order and search are reactive parameters — changing either
/// rebinds the underlying query.
pub struct PeopleView {
    db: Arc<Database>,
    order: Mutex<SortOrder>,
    search: Mutex<String>,
    people: LiveQuery<Vec<Value>>,
}

impl PeopleView {
    pub fn new(db: Arc<Database>) -> Self {
        let notifier: Arc<dyn Notifier> = db.notifier();
        let people = create_derived_query(
            notifier,
            Arc::new(PeopleQuery::new(
                Arc::clone(&db),
                String::new(),
                SortOrder::Asc,
            )),
        );
        Self {
            db,
            order: Mutex::new(SortOrder::Asc),
            search: Mutex::new(String::new()),
            people,
        }
    }

    pub fn people(&self) -> &LiveQuery<Vec<Value>> {
        &self.people
    }

    /// Current rows, or `None` before the first query resolves.
    pub fn rows(&self) -> Option<Vec<Value>> {
        self.people.value()
    }

    pub fn set_order(&self, order: SortOrder) {
        *self.order.lock() = order;
        self.rebind();
    }

    pub fn set_search(&self, text: impl Into<String>) {
        *self.search.lock() = text.into();
        self.rebind();
    }

    fn rebind(&self) {
        let source = PeopleQuery::new(
            Arc::clone(&self.db),
            self.search.lock().clone(),
            *self.order.lock(),
        );
        // The view owns the query and never tears it down while alive.
        let _ = self.people.set_query(Arc::new(source));
    }

    /// Insert a random person.
    pub fn add_person(&self) -> StoreResult<Person> {
        let person = Person {
            id: gen_uuid(),
            name: generate_random_name(),
            age: generate_random_value(),
        };
        self.db.insert_person(&person)?;
        Ok(person)
    }

    pub fn clear(&self) -> StoreResult<usize> {
        self.db.delete_all_people()
    }

    /// Set the first person's age to 5. Returns the affected id.
    pub fn change_first(&self) -> StoreResult<Option<String>> {
        match self.db.first_person()? {
            Some(p) => {
                self.db.update_person_age(&p.id, 5)?;
                Ok(Some(p.id))
            }
            None => Ok(None),
        }
    }

    /// Open the detail dialog for one person.
    pub fn open_person(&self, id: impl Into<String>) -> PersonDetail {
        PersonDetail::new(Arc::clone(&self.db), id.into())
    }
}

// ============================================================================
// PersonDetail
// ============================================================================

/// The person dialog: one person, their memberships, and the full club
/// list with a checkbox per club.
pub struct PersonDetail {
    db: Arc<Database>,
    person_id: String,
    person: LiveQuery<Option<Value>>,
    memberships: LiveQuery<Vec<Value>>,
    clubs: LiveQuery<Vec<Value>>,
}

impl PersonDetail {
    pub fn new(db: Arc<Database>, person_id: String) -> Self {
        let notifier: Arc<dyn Notifier> = db.notifier();
        let person = create_live_query(
            Arc::clone(&notifier),
            Arc::new(PersonByIdQuery::new(Arc::clone(&db), person_id.clone())),
        );
        let memberships = create_live_query(
            Arc::clone(&notifier),
            Arc::new(MembershipsQuery::new(Arc::clone(&db), person_id.clone())),
        );
        let clubs = create_live_query(notifier, Arc::new(ClubsQuery::new(Arc::clone(&db))));
        Self {
            db,
            person_id,
            person,
            memberships,
            clubs,
        }
    }

    pub fn person(&self) -> &LiveQuery<Option<Value>> {
        &self.person
    }

    pub fn memberships(&self) -> &LiveQuery<Vec<Value>> {
        &self.memberships
    }

    pub fn clubs(&self) -> &LiveQuery<Vec<Value>> {
        &self.clubs
    }

    pub fn is_member(&self, club_id: &str) -> bool {
        self.memberships
            .value()
            .map_or(false, |rows| rows.iter().any(|m| m["club_id"] == club_id))
    }

    pub fn create_membership(&self, club_id: &str) -> StoreResult<ClubMember> {
        let member = ClubMember {
            id: gen_uuid(),
            club_id: club_id.to_string(),
            person_id: self.person_id.clone(),
        };
        self.db.insert_member(&member)?;
        Ok(member)
    }

    pub fn remove_membership(&self, club_id: &str) -> StoreResult<usize> {
        self.db.delete_membership(club_id, &self.person_id)
    }

    /// Join the club if not a member, leave it otherwise. Returns whether
    /// the person is a member afterwards.
    pub fn toggle_membership(&self, club_id: &str) -> StoreResult<bool> {
        if self.is_member(club_id) {
            self.remove_membership(club_id)?;
            Ok(false)
        } else {
            self.create_membership(club_id)?;
            Ok(true)
        }
    }
}

// ============================================================================
// ClubsView
// ============================================================================

/// The clubs list.
pub struct ClubsView {
    db: Arc<Database>,
    clubs: LiveQuery<Vec<Value>>,
}

impl ClubsView {
    pub fn new(db: Arc<Database>) -> Self {
        let notifier: Arc<dyn Notifier> = db.notifier();
        let clubs = create_live_query(notifier, Arc::new(ClubsQuery::new(Arc::clone(&db))));
        Self { db, clubs }
    }

    pub fn clubs(&self) -> &LiveQuery<Vec<Value>> {
        &self.clubs
    }

    pub fn rows(&self) -> Option<Vec<Value>> {
        self.clubs.value()
    }

    /// Insert a random club.
    pub fn add_club(&self) -> StoreResult<Club> {
        let club = Club {
            id: gen_uuid(),
            name: generate_random_club(),
            age: generate_random_value(),
        };
        self.db.insert_club(&club)?;
        Ok(club)
    }

    pub fn clear_clubs(&self) -> StoreResult<usize> {
        self.db.delete_all_clubs()
    }

    /// Set the first club's age to 5. Returns the affected id.
    pub fn change_first(&self) -> StoreResult<Option<String>> {
        match self.db.first_club()? {
            Some(c) => {
                self.db.update_club_age(&c.id, 5)?;
                Ok(Some(c.id))
            }
            None => Ok(None),
        }
    }
}
