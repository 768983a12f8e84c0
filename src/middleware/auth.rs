use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::error::AppError;
use crate::identity::TokenVerifier;
use crate::models::CreatedBy;

/// Authenticated user info injected by the auth middleware into request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

impl From<AuthenticatedUser> for CreatedBy {
    fn from(user: AuthenticatedUser) -> Self {
        CreatedBy {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Public paths that do not require a bearer token
const PUBLIC_PATHS: &[&str] = &["/api/health", "/api/vehicles"];

#[derive(Clone)]
pub struct AuthLayer {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthLayer {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            verifier: self.verifier.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    verifier: Arc<dyn TokenVerifier>,
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        std::mem::swap(&mut self.inner, &mut inner);

        let verifier = self.verifier.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();

            // Public paths and CORS preflight pass straight through
            if req.method() == Method::OPTIONS || PUBLIC_PATHS.iter().any(|p| path == *p) {
                return inner.call(req).await;
            }

            let Some(token) = bearer_token(&req) else {
                return Ok(
                    AppError::Unauthorized("Authorization header required".to_string())
                        .into_response(),
                );
            };

            match verifier.verify(&token).await {
                Ok(user) => {
                    tracing::debug!("Authenticated user {} for {}", user.user_id, path);
                    req.extensions_mut().insert(user);
                    inner.call(req).await
                }
                Err(e) => {
                    tracing::warn!("Token verification failed for {}: {}", path, e);
                    Ok(e.into_response())
                }
            }
        })
    }
}
