//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        version = "1.0.0",
        description = "Library lending system REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/library/api", description = "Library API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Book catalog
        books::search_books,
        books::get_book,
        // User directory
        users::search_users,
        users::get_user,
        users::create_user,
        users::delete_user,
        // Loan ledger
        loans::get_user_loans,
        loans::borrow_book,
        loans::return_book,
    ),
    components(
        schemas(
            library_commons::model::Book,
            library_commons::model::LoanStatus,
            library_commons::model::User,
            library_commons::model::Loan,
            crate::models::user::CreateUser,
            crate::error::ErrorResponse,
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "users", description = "User directory"),
        (name = "loans", description = "Loan ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
