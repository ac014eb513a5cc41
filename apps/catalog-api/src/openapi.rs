//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Product catalog CRUD API backed by MongoDB",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
struct CatalogInfo;

/// Combined OpenAPI documentation for the Catalog API
///
/// Product paths are already rooted at `/products`, so the domain document
/// is merged rather than nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = CatalogInfo::openapi();
        doc.merge(domain_products::ApiDoc::openapi());
        doc
    }
}
