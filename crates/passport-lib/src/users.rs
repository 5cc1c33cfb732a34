// ============================
// passport-lib/src/users.rs
// ============================
//! User repository abstraction with an in-memory implementation.
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Display name; defaults to the mobile number at registration
    pub name: String,
    /// Mobile number, unique across users and immutable
    pub mobile: String,
    /// Hashed credential in PHC string format
    pub password_hash: String,
}

/// A user record about to be persisted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub mobile: String,
    pub password_hash: String,
}

/// Errors surfaced by a repository backend
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("mobile number already taken")]
    Duplicate,

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Trait for user storage backends
///
/// `insert` is atomic: either the full record is persisted or nothing is,
/// and the uniqueness constraint on `mobile` decides races between
/// concurrent inserts (exactly one wins).
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by mobile number
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<User>, RepoError>;

    /// Persist a new user, enforcing mobile uniqueness
    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError>;
}

/// In-memory implementation of the `UserRepository` trait, keyed by mobile
#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<String, User>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepo {
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<User>, RepoError> {
        Ok(self.users.get(mobile).map(|user| user.clone()))
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
        match self.users.entry(new_user.mobile.clone()) {
            Entry::Occupied(_) => Err(RepoError::Duplicate),
            Entry::Vacant(slot) => {
                let user = User {
                    id: Uuid::new_v4(),
                    name: new_user.name,
                    mobile: new_user.mobile,
                    password_hash: new_user.password_hash,
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }
}
