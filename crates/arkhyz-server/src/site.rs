use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use axum::{Router, middleware};
use tower_http::services::{ServeDir, ServeFile};

use arkhyz_api::{AdminAccess, require_admin};

const ADMIN_PAGE_NAME: &str = "admin.html";

/// With admin routes protected, the admin page must live outside the public
/// directory: `ServeDir` decodes request paths itself, so a copy inside it is
/// reachable under spellings the guarded route never sees.
pub fn check_layout(static_dir: &Path, admin_page: &Path, access: &AdminAccess) -> Result<()> {
    if matches!(access, AdminAccess::Disabled) {
        return Ok(());
    }
    if static_dir.join(ADMIN_PAGE_NAME).exists() {
        bail!(
            "{} is inside the public directory {}; move it to the admin page path",
            ADMIN_PAGE_NAME,
            static_dir.display()
        );
    }
    if let (Ok(dir), Ok(page)) = (static_dir.canonicalize(), admin_page.canonicalize()) {
        if page.starts_with(&dir) {
            bail!(
                "Admin page {} must not be inside the public directory {}",
                admin_page.display(),
                static_dir.display()
            );
        }
    }
    Ok(())
}

/// Landing page at `/`, the admin page at `/admin.html` behind the same
/// credentials as the admin API, and everything else from the public directory.
pub fn static_site(static_dir: &Path, admin_page: &Path, access: &AdminAccess) -> Router {
    let admin = Router::new().route_service("/admin.html", ServeFile::new(admin_page));
    let admin = match access {
        AdminAccess::Protected(credentials) => admin.layer(middleware::from_fn_with_state(
            Arc::new(credentials.clone()),
            require_admin,
        )),
        AdminAccess::Disabled => admin,
    };

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("start-sales.html")))
        .merge(admin)
        .fallback_service(ServeDir::new(static_dir))
}
