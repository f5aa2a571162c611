use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::Resource;
use crate::auth::password::hash_password_blocking;
use crate::database::{Collection, Datastore, NewUser, User, UserView};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::policy::{restrict_payload, Access};
use crate::types::{Operation, Role};
use crate::validation::UserInput;

pub struct UserResource;

#[async_trait]
impl Resource for UserResource {
    type Record = User;
    type Input = UserInput;
    type View = UserView;

    const LABEL: &'static str = "User";

    fn access(operation: Operation) -> Access {
        match operation {
            Operation::List | Operation::Create => Access::Admin,
            Operation::Get | Operation::Update | Operation::Delete => Access::OwnerOrAdmin,
        }
    }

    fn collection(store: &Datastore) -> Arc<dyn Collection<User>> {
        store.users.clone()
    }

    fn editable_fields(user: &User) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("firstName".into(), json!(user.first_name));
        fields.insert("lastName".into(), json!(user.last_name));
        fields.insert("email".into(), json!(user.email));
        fields.insert("role".into(), json!(user.role.as_str()));
        fields
    }

    fn restrict(caller: Option<&AuthUser>, payload: &mut Map<String, Value>) {
        restrict_payload(caller, payload);
    }

    async fn prepare(input: UserInput, existing: Option<&User>) -> Result<NewUser, ApiError> {
        let password_hash = match (input.password, existing) {
            (Some(password), _) => hash_password_blocking(password).await?,
            (None, Some(user)) => user.password_hash.clone(),
            (None, None) => return Err(ApiError::internal("user created without a password")),
        };

        Ok(NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
            role: input
                .role
                .or(existing.map(|user| user.role))
                .unwrap_or(Role::User),
        })
    }

    fn view(user: User) -> UserView {
        UserView::from(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::database::Entity;
    use chrono::Utc;
    use uuid::Uuid;

    fn stored(role: Role) -> User {
        let now = Utc::now();
        User::materialize(
            Uuid::new_v4(),
            NewUser {
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                email: "grace@example.com".into(),
                password_hash: "existing-hash".into(),
                role,
            },
            now,
            now,
        )
    }

    fn input(password: Option<&str>, role: Option<Role>) -> UserInput {
        UserInput {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            password: password.map(String::from),
            role,
        }
    }

    #[tokio::test]
    async fn new_password_is_hashed() {
        let new = UserResource::prepare(input(Some("cobol-rules"), None), None).await.unwrap();
        assert_ne!(new.password_hash, "cobol-rules");
        assert!(verify_password("cobol-rules", &new.password_hash));
        assert_eq!(new.role, Role::User);
    }

    #[tokio::test]
    async fn update_without_password_keeps_hash_and_role() {
        let existing = stored(Role::Admin);
        let new = UserResource::prepare(input(None, None), Some(&existing)).await.unwrap();
        assert_eq!(new.password_hash, "existing-hash");
        assert_eq!(new.role, Role::Admin);
    }

    #[test]
    fn editable_fields_never_include_the_hash() {
        let fields = UserResource::editable_fields(&stored(Role::User));
        assert!(!fields.values().any(|v| v == "existing-hash"));
        assert_eq!(fields["role"], "user");
    }
}
