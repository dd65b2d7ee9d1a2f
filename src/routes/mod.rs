//! Route table assembly. Each sub-application contributes its own table through
//! a constructor listed in `SUB_APPS`. Entries name functions, so a missing
//! module fails to compile; a bad table is rejected before the server binds.

mod accounts;
mod catalog;
mod common;
mod orders;

pub use common::common_routes;

use crate::config::Settings;
use crate::error::ConfigError;
use crate::state::AppState;
use axum::routing::MethodRouter;
use axum::Router;
use std::collections::HashMap;
use tower_http::limit::RequestBodyLimitLayer;

/// Paths and their method routers for one sub-application.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<(&'static str, MethodRouter<AppState>)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &'static str, method_router: MethodRouter<AppState>) -> Self {
        self.routes.push((path, method_router));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.iter().map(|(path, _)| *path)
    }
}

/// A named route-table constructor.
#[derive(Clone, Copy)]
pub struct SubApp {
    pub name: &'static str,
    pub routes: fn() -> RouteTable,
}

pub const SUB_APPS: &[SubApp] = &[
    SubApp { name: "products", routes: catalog::products },
    SubApp { name: "tags", routes: catalog::tags },
    SubApp { name: "properties", routes: catalog::properties },
    SubApp { name: "orders", routes: orders::orders },
    SubApp { name: "cart", routes: orders::cart },
    SubApp { name: "users", routes: accounts::users },
    SubApp { name: "sellers", routes: accounts::sellers },
];

/// Health, readiness, version and schema routes. Always mounted at the root.
pub const COMMON: SubApp = SubApp {
    name: "common",
    routes: common_routes,
};

/// Route identity as the router sees it: parameter names do not matter.
fn route_key(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.chars().next() {
            Some(':') => ":",
            Some('*') => "*",
            _ => segment,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build one router from every sub-application's table. Empty tables, repeated
/// names and paths bound twice (under any parameter names) are errors.
pub fn assemble(apps: &[SubApp]) -> Result<Router<AppState>, ConfigError> {
    let mut names: Vec<&'static str> = Vec::with_capacity(apps.len());
    let mut owners: HashMap<String, &'static str> = HashMap::new();
    let mut router = Router::new();

    for app in apps {
        if names.contains(&app.name) {
            return Err(ConfigError::DuplicateSubApp(app.name));
        }
        names.push(app.name);

        let table = (app.routes)();
        if table.is_empty() {
            return Err(ConfigError::MissingRouteTable(app.name));
        }
        for path in table.paths() {
            if let Some(first) = owners.insert(route_key(path), app.name) {
                return Err(ConfigError::DuplicateRoute {
                    path,
                    first,
                    second: app.name,
                });
            }
        }
        tracing::debug!(sub_app = app.name, routes = table.routes.len(), "sub-application mounted");
        for (path, method_router) in table.routes {
            router = router.route(path, method_router);
        }
    }
    Ok(router)
}

/// The complete application: common routes at the root, sub-applications under
/// `settings.api_prefix`, body size limit on everything.
pub fn build_app(state: AppState, settings: &Settings) -> Result<Router, ConfigError> {
    build_router(SUB_APPS, &settings.api_prefix)
        .map(|router| router.layer(RequestBodyLimitLayer::new(settings.body_limit)).with_state(state))
}

/// Without a prefix the common routes share the root with every sub-application
/// and are checked against them like any other table.
fn build_router(apps: &[SubApp], api_prefix: &str) -> Result<Router<AppState>, ConfigError> {
    if api_prefix.is_empty() {
        let mut all = Vec::with_capacity(apps.len() + 1);
        all.push(COMMON);
        all.extend_from_slice(apps);
        assemble(&all)
    } else {
        let api = assemble(apps)?;
        Ok(assemble(&[COMMON])?.nest(api_prefix, api))
    }
}
