use super::Store;
use crate::auth::models::CreateUserRequest;
use crate::auth::FirebaseAuth;
use crate::model::User;
use crate::roles::Role;
use crate::Error;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

/// A staff account to create.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub shop_id: Option<String>,
}

/// Creates and removes staff accounts.
///
/// A staff member is an auth account carrying a `role` custom claim plus a
/// profile at `users/{uid}`; the two are kept in step here.
#[derive(Clone)]
pub struct UserProvisioner {
    auth: FirebaseAuth,
    store: Store,
}

impl UserProvisioner {
    pub fn new(auth: FirebaseAuth, store: Store) -> Self {
        Self { auth, store }
    }

    /// Creates the account, grants the role claim and writes the profile.
    ///
    /// If a step after account creation fails the account is deleted again and
    /// the error of the failed step is returned.
    pub async fn provision(&self, new_user: NewUser) -> Result<User, Error> {
        let account = self
            .auth
            .create_user(CreateUserRequest {
                email: Some(new_user.email.clone()),
                password: Some(new_user.password.clone()),
                display_name: Some(new_user.name.clone()),
                phone_number: new_user.phone.clone(),
                ..Default::default()
            })
            .await?;
        let uid = account.local_id;

        let user = User {
            id: uid.clone(),
            name: Some(new_user.name),
            email: Some(new_user.email),
            role: Some(new_user.role.as_str().to_string()),
            phone: new_user.phone,
            shop_id: new_user.shop_id,
            active: Some(true),
            created_at: Some(Utc::now()),
        };

        if let Err(e) = self.finish(&uid, new_user.role, &user).await {
            warn!(%uid, error = %e, "provisioning failed, deleting account");
            if let Err(cleanup) = self.auth.delete_user(&uid).await {
                warn!(%uid, error = %cleanup, "failed to delete partially provisioned account");
            }
            return Err(e);
        }

        info!(%uid, role = %new_user.role, "provisioned user");
        Ok(user)
    }

    async fn finish(&self, uid: &str, role: Role, user: &User) -> Result<(), Error> {
        let mut claims = serde_json::Map::new();
        claims.insert("role".into(), Value::String(role.as_str().to_string()));
        self.auth.set_custom_user_claims(uid, &claims).await?;
        self.store.users().set(uid, user).await?;
        Ok(())
    }

    /// Changes the role claim, keeping any other claims, and the profile's role.
    pub async fn change_role(&self, uid: &str, role: Role) -> Result<(), Error> {
        let account = self.auth.get_user(uid).await?;
        let mut claims = account.custom_claims();
        claims.insert("role".into(), Value::String(role.as_str().to_string()));
        self.auth.set_custom_user_claims(uid, &claims).await?;

        self.store
            .users()
            .update(uid, &json!({ "role": role.as_str() }))
            .await?;
        info!(%uid, role = %role, "changed role");
        Ok(())
    }

    /// Removes the profile, then the account.
    pub async fn deprovision(&self, uid: &str) -> Result<(), Error> {
        self.store.users().remove(uid).await?;
        self.auth.delete_user(uid).await?;
        info!(%uid, "deprovisioned user");
        Ok(())
    }
}
