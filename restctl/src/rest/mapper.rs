//! Request body to DTO mapping.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{errors::Error, rest::dto::RestDto};

/// `Json<T>` whose rejections are 400s with the usual error body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::BadRequest {
                message: rejection.body_text(),
            })?;

        Ok(ApiJson(value))
    }
}

/// Extractor that maps a JSON body onto `D` via [`RestDto::from_json`], recording the
/// properties the client sent.
#[derive(Debug)]
pub struct MappedDto<D>(pub D);

impl<D, S> FromRequest<S> for MappedDto<D>
where
    D: RestDto,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ApiJson(body) = ApiJson::<Value>::from_request(req, state).await?;
        D::from_json(body).map(MappedDto)
    }
}
