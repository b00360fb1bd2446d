use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::api::format::{into_document, timestamp};
use crate::auth::password::{self, DecoyHash, PasswordError};
use crate::auth::{Role, TokenPayload};
use crate::database::{Database, DatabaseError, Document};
use crate::filter::FilterData;

pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Malformed user record: {0}")]
    MalformedRecord(String),
}

/// A user document as stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub is_onboarded: bool,
    #[serde(rename = "password", default, skip_serializing)]
    pub password_hash: String,
}

/// The user as clients see it: no password hash, public `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    pub is_onboarded: bool,
}

impl UserRecord {
    pub fn from_document(document: Document) -> Result<Self, CredentialError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| CredentialError::MalformedRecord(e.to_string()))
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            school_id: self.school_id.clone(),
            is_onboarded: self.is_onboarded,
        }
    }

    pub fn token_payload(&self) -> TokenPayload {
        TokenPayload {
            user_id: self.id.clone(),
            role: self.role,
            school_id: self.school_id.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Reads user records and checks passwords against their bcrypt hashes.
pub struct CredentialStore {
    db: Arc<Database>,
    bcrypt_cost: u32,
    decoy: DecoyHash,
}

impl CredentialStore {
    /// Hashes the login decoy before returning, so the first unknown-email
    /// login costs no more than any other.
    pub fn new(db: Arc<Database>, bcrypt_cost: u32) -> Result<Self, PasswordError> {
        Ok(Self {
            db,
            bcrypt_cost,
            decoy: DecoyHash::new(bcrypt_cost)?,
        })
    }

    /// Exact, case-sensitive email match.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, CredentialError> {
        let store = self.db.store().await?;
        store
            .find_first(USERS_COLLECTION, FilterData::new().where_eq("email", email))
            .await?
            .map(UserRecord::from_document)
            .transpose()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, CredentialError> {
        let store = self.db.store().await?;
        store
            .find_one(USERS_COLLECTION, id)
            .await?
            .map(UserRecord::from_document)
            .transpose()
    }

    pub async fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        Ok(password::verify_password(plain.to_string(), hash.to_string()).await?)
    }

    /// Checks `plain` against the user's hash, or burns an equivalent bcrypt
    /// round when there is no user, so both failures take the same path.
    pub async fn check(&self, user: Option<&UserRecord>, plain: &str) -> Result<bool, CredentialError> {
        match user {
            Some(user) => self.verify_password(plain, &user.password_hash).await,
            None => Ok(self.decoy.burn(plain.to_string()).await?),
        }
    }

    /// Inserts a user with a freshly hashed password. Uniqueness is the caller's check.
    pub async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, CredentialError> {
        let password_hash = password::hash_password(new_user.password, self.bcrypt_cost).await?;
        let now = timestamp();

        let document = into_document(json!({
            "name": new_user.name,
            "email": new_user.email,
            "password": password_hash,
            "role": new_user.role,
            "isOnboarded": false,
            "createdAt": now,
            "updatedAt": now,
        }));

        let store = self.db.store().await?;
        let id = store.insert(USERS_COLLECTION, document).await?;

        Ok(UserRecord {
            id,
            email: new_user.email,
            name: new_user.name,
            role: new_user.role,
            school_id: None,
            is_onboarded: false,
            password_hash,
        })
    }

    /// Binds the user to a school and marks onboarding complete.
    pub async fn complete_onboarding(&self, user_id: &str, school_id: &str) -> Result<bool, CredentialError> {
        let mut changes = Document::new();
        changes.insert("schoolId".to_string(), Value::String(school_id.to_string()));
        changes.insert("isOnboarded".to_string(), Value::Bool(true));
        changes.insert("updatedAt".to_string(), timestamp());

        let store = self.db.store().await?;
        Ok(store.update(USERS_COLLECTION, user_id, changes).await?)
    }
}
