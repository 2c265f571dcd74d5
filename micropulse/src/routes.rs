use crate::errors::ApiError;
use crate::handlers::{self, Handler};
use axum::http::Method;
use serde::Serialize;

/// A literal path bound to a handler. Built once at startup, immutable
/// until process exit.
#[derive(Debug)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub methods: Vec<Method>,
    pub description: &'static str,
    pub handler: Handler,
}

/// Entry in the welcome document's endpoint table.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDoc {
    pub path: &'static str,
    pub method: String,
    pub description: &'static str,
}

pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        let routes = vec![
            Route {
                name: "root",
                path: "/",
                methods: vec![Method::GET],
                description: "API welcome and documentation",
                handler: handlers::root,
            },
            Route {
                name: "ping",
                path: "/ping",
                methods: vec![Method::GET],
                description: "Simple ping-pong response",
                handler: handlers::ping,
            },
            Route {
                name: "healthz",
                path: "/healthz",
                methods: vec![Method::GET],
                description: "Health check endpoint",
                handler: handlers::healthz,
            },
            Route {
                name: "info",
                path: "/info",
                methods: vec![Method::GET],
                description: "Application and system information",
                handler: handlers::info,
            },
            Route {
                name: "version",
                path: "/version",
                methods: vec![Method::GET],
                description: "Application version",
                handler: handlers::version,
            },
            Route {
                name: "echo",
                path: "/echo",
                methods: vec![Method::POST],
                description: "Echo back the request body",
                handler: handlers::echo,
            },
            Route {
                name: "metrics",
                path: "/metrics",
                methods: vec![Method::GET],
                description: "Prometheus metrics exposition",
                handler: handlers::metrics,
            },
        ];
        RouteTable { routes }
    }

    /// Exact string match on path; a disallowed method on a known path is
    /// reported the same way as an unknown path.
    pub fn find(&self, method: &Method, path: &str) -> Result<&Route, ApiError> {
        self.routes
            .iter()
            .find(|route| route.path == path && route.methods.contains(method))
            .ok_or_else(|| ApiError::RouteNotFound {
                method: method.clone(),
                path: path.to_string(),
            })
    }

    pub fn endpoint_docs(&self) -> Vec<EndpointDoc> {
        self.routes
            .iter()
            .flat_map(|route| {
                route.methods.iter().map(move |method| EndpointDoc {
                    path: route.path,
                    method: method.as_str().to_string(),
                    description: route.description,
                })
            })
            .collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}
