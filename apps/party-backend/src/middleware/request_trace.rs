//! Per-request trace id, span and completion log.
//!
//! Every request gets a fresh `trace_id` that is
//! - stored in the request extensions,
//! - installed as task-local context so `AppError` can echo it,
//! - attached to a `request` span wrapping the handler,
//! - returned as the `x-trace-id` response header.

use std::cell::RefCell;
use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tokio::task_local;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

task_local! {
    static TRACE_ID: RefCell<Option<String>>;
}

/// Trace id of the request being handled, or "unknown" outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
        .unwrap_or_else(|| "unknown".to_string())
}

/// Run a future with `trace_id` installed as the task-local trace context.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(RefCell::new(Some(trace_id)), future).await
}

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let trace_id = Uuid::new_v4().to_string();
        req.extensions_mut().insert(trace_id.clone());

        let method = req.method().to_string();
        let path = req.path().to_string();
        let span = info_span!("request", trace_id = %trace_id, method = %method, path = %path);

        let fut = self.service.call(req);

        Box::pin(
            async move {
                let result = with_trace_id(trace_id.clone(), fut).await;

                let status = match &result {
                    Ok(res) => res.status(),
                    Err(err) => err.as_response_error().status_code(),
                };
                let status_code = status.as_u16();
                let duration_us = start.elapsed().as_micros() as u64;

                if status.is_server_error() {
                    error!(http.status_code = status_code, duration_us, "request_completed");
                } else if status.is_client_error() {
                    warn!(http.status_code = status_code, duration_us, "request_completed");
                } else {
                    info!(http.status_code = status_code, duration_us, "request_completed");
                }

                let mut res = result?;
                res.headers_mut().insert(
                    HeaderName::from_static("x-trace-id"),
                    HeaderValue::from_str(&trace_id)
                        .unwrap_or_else(|_| HeaderValue::from_static("invalid-trace-id")),
                );
                Ok(res)
            }
            .instrument(span),
        )
    }
}
