//! 请求提取器
//!
//! 包装 axum 的 `Json`/`Query`/`Path`，解析失败时返回统一的
//! `{"error":{code,message,requestId}}` 错误体，而不是 axum 默认的纯文本。

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON 请求体
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

/// 查询参数
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

/// 路径参数
#[derive(Debug, Clone, Copy)]
pub struct AppPath<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        // 缺少路径参数属于路由配置错误
        if rejection.status().is_server_error() {
            tracing::error!(error = %rejection.body_text(), "Path extraction failed");
            return AppError::Internal(rejection.body_text());
        }
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{self, header, StatusCode},
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    #[tokio::test]
    async fn test_malformed_json_becomes_validation_error() {
        let req = http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let err = AppJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_content_type_becomes_validation_error() {
        let req = http::Request::builder().body(Body::from(r#"{"name":"x"}"#)).unwrap();

        let err = AppJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_bad_query_becomes_validation_error() {
        #[derive(Debug, Deserialize)]
        struct Page {
            #[allow(dead_code)]
            page: i64,
        }

        let req = http::Request::builder().uri("/items?page=abc").body(()).unwrap();
        let (mut parts, _) = req.into_parts();

        let err = AppQuery::<Page>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
