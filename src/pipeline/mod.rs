//! The validate, authorize, persist, respond sequence shared by every resource.
//!
//! A [`Resource`] names its record type, input shape, access rules and
//! public view; [`CrudPipeline`] runs the five operations for it.

pub mod inventory;
pub mod users;

use async_trait::async_trait;
use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::database::{parse_id, Collection, Datastore, Entity};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::policy::{authorize_caller, Access, Decision, DenyReason};
use crate::types::{Operation, Stage};
use crate::validation::{Mode, Shape};

pub use inventory::InventoryResource;
pub use users::UserResource;

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Record: Entity;
    type Input: Shape + Send + 'static;
    type View: Serialize + Send;

    /// Human name used in not-found messages
    const LABEL: &'static str;

    fn access(operation: Operation) -> Access;

    fn collection(store: &Datastore) -> Arc<dyn Collection<Self::Record>>;

    /// The stored values a client may change, keyed as the client sends them
    fn editable_fields(record: &Self::Record) -> Map<String, Value>;

    /// Overlay a partial payload on the stored values
    fn merge(mut existing: Map<String, Value>, payload: Map<String, Value>) -> Map<String, Value> {
        existing.extend(payload);
        existing
    }

    /// Strip fields the caller may not set
    fn restrict(_caller: Option<&AuthUser>, _payload: &mut Map<String, Value>) {}

    /// Turn validated input into column values
    async fn prepare(
        input: Self::Input,
        existing: Option<&Self::Record>,
    ) -> Result<<Self::Record as Entity>::New, ApiError>;

    fn view(record: Self::Record) -> Self::View;
}

/// Request bodies must be JSON objects
pub fn into_object(payload: Value) -> Result<Map<String, Value>, ApiError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

/// A request body that has not been inspected yet. Extraction failures are
/// held back until the caller has been authenticated.
pub type Payload = Result<Value, ApiError>;

pub fn payload(body: Result<Json<Value>, JsonRejection>) -> Payload {
    body.map(|Json(value)| value).map_err(ApiError::from)
}

pub struct CrudPipeline<R: Resource> {
    collection: Arc<dyn Collection<R::Record>>,
    _resource: PhantomData<R>,
}

impl<R: Resource> CrudPipeline<R> {
    pub fn new(store: &Datastore) -> Self {
        Self {
            collection: R::collection(store),
            _resource: PhantomData,
        }
    }

    fn stage(operation: Operation, stage: Stage) {
        debug!(
            resource = <R::Record as Entity>::COLLECTION,
            ?operation,
            ?stage,
            "pipeline stage"
        );
    }

    /// Reject anonymous callers of protected operations before anything about
    /// the request itself is looked at.
    pub fn authenticate(caller: Option<&AuthUser>, operation: Operation) -> Result<(), ApiError> {
        Self::stage(operation, Stage::Authenticating);
        if caller.is_none() && R::access(operation) != Access::Public {
            return Decision::Deny(DenyReason::Unauthenticated).into_result();
        }
        Ok(())
    }

    fn authorize(caller: Option<&AuthUser>, operation: Operation, target: Option<Uuid>) -> Result<(), ApiError> {
        Self::stage(operation, Stage::Authorizing);
        authorize_caller(caller, R::access(operation), target).into_result()
    }

    fn validate(operation: Operation, payload: &Map<String, Value>, mode: Mode) -> Result<R::Input, ApiError> {
        Self::stage(operation, Stage::Validating);
        R::Input::validate(payload, mode).map_err(ApiError::validation_error)
    }

    fn not_found() -> ApiError {
        ApiError::not_found(format!("{} not found", R::LABEL))
    }

    pub async fn list(&self, caller: Option<&AuthUser>) -> Result<Vec<R::View>, ApiError> {
        let op = Operation::List;
        Self::stage(op, Stage::Received);
        Self::authenticate(caller, op)?;
        Self::authorize(caller, op, None)?;

        Self::stage(op, Stage::Persisting);
        let records = self.collection.list().await?;

        Self::stage(op, Stage::Responding);
        Ok(records.into_iter().map(R::view).collect())
    }

    pub async fn get(&self, caller: Option<&AuthUser>, id: &str) -> Result<R::View, ApiError> {
        let op = Operation::Get;
        Self::stage(op, Stage::Received);
        Self::authenticate(caller, op)?;
        let id = parse_id(id)?;
        Self::authorize(caller, op, Some(id))?;

        Self::stage(op, Stage::Persisting);
        let record = self.collection.find(id).await?.ok_or_else(Self::not_found)?;

        Self::stage(op, Stage::Responding);
        Ok(R::view(record))
    }

    pub async fn create(&self, caller: Option<&AuthUser>, payload: Payload) -> Result<R::View, ApiError> {
        let op = Operation::Create;
        Self::stage(op, Stage::Received);
        Self::authenticate(caller, op)?;
        let mut payload = into_object(payload?)?;
        Self::authorize(caller, op, None)?;
        R::restrict(caller, &mut payload);

        let input = Self::validate(op, &payload, Mode::Create)?;
        let new = R::prepare(input, None).await?;

        Self::stage(op, Stage::Persisting);
        let record = self.collection.insert(new).await?;

        Self::stage(op, Stage::Responding);
        tracing::info!(
            resource = <R::Record as Entity>::COLLECTION,
            id = %record.id(),
            "Record created"
        );
        Ok(R::view(record))
    }

    pub async fn update(&self, caller: Option<&AuthUser>, id: &str, payload: Payload) -> Result<R::View, ApiError> {
        let op = Operation::Update;
        Self::stage(op, Stage::Received);
        Self::authenticate(caller, op)?;
        let id = parse_id(id)?;
        let mut payload = into_object(payload?)?;
        Self::authorize(caller, op, Some(id))?;
        R::restrict(caller, &mut payload);

        let existing = self.collection.find(id).await?.ok_or_else(Self::not_found)?;
        let merged = R::merge(R::editable_fields(&existing), payload);

        let input = Self::validate(op, &merged, Mode::Merge)?;
        let changes = R::prepare(input, Some(&existing)).await?;

        Self::stage(op, Stage::Persisting);
        // The record may vanish between the read and the write
        let record = self
            .collection
            .update(id, changes)
            .await?
            .ok_or_else(Self::not_found)?;

        Self::stage(op, Stage::Responding);
        Ok(R::view(record))
    }

    pub async fn delete(&self, caller: Option<&AuthUser>, id: &str) -> Result<(), ApiError> {
        let op = Operation::Delete;
        Self::stage(op, Stage::Received);
        Self::authenticate(caller, op)?;
        let id = parse_id(id)?;
        Self::authorize(caller, op, Some(id))?;

        Self::stage(op, Stage::Persisting);
        if !self.collection.delete(id).await? {
            return Err(Self::not_found());
        }

        Self::stage(op, Stage::Responding);
        tracing::info!(
            resource = <R::Record as Entity>::COLLECTION,
            %id,
            "Record deleted"
        );
        Ok(())
    }
}
